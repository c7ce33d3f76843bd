//! Outbound transport for target-site traffic and rotation calls
//!
//! A [`Session`] is one HTTP client bound to the residential proxy and the
//! browser-impersonation headers. A [`Connector`] builds sessions and talks to
//! the provider's rotation endpoint directly, bypassing the proxy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::{Client, Proxy, StatusCode};
use tracing::{debug, instrument};

use crate::error::{PriceFetchError, Result};
use crate::models::ProxyConfig;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed header set sent with every target-site request
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let client_hints: [(&str, &str); 7] = [
        (
            "sec-ch-ua",
            r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#,
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""macOS""#),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
    ];
    for (name, value) in client_hints {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    headers
}

/// Reply from the provider's rotation endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationResponse {
    pub status: StatusCode,
    pub body: String,
}

/// One outbound HTTP session bound to a proxy
#[async_trait]
pub trait Session: Send + Sync {
    /// GET `url` and return the body, whatever the status code
    async fn get(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// Factory for sessions plus the direct line to the rotation endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    /// Build a fresh session routed through `config`
    fn build_session(&self, config: &ProxyConfig) -> Result<Box<dyn Session>>;

    /// Call the rotation endpoint without going through the proxy
    async fn request_rotation(&self, endpoint: &str, timeout: Duration)
        -> Result<RotationResponse>;
}

/// `reqwest`-backed session
pub struct HttpSession {
    client: Client,
}

#[async_trait]
impl Session for HttpSession {
    #[instrument(skip(self, timeout))]
    async fn get(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_request_error)?;
        debug!(%status, bytes = body.len(), "Response received");
        Ok(body)
    }
}

/// Production connector
pub struct HttpConnector {
    direct: Client,
}

impl HttpConnector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            direct: Client::builder().build()?,
        })
    }
}

#[async_trait]
impl Connector for HttpConnector {
    fn build_session(&self, config: &ProxyConfig) -> Result<Box<dyn Session>> {
        // One proxy for both plain and TLS traffic
        let proxy = Proxy::all(config.url())
            .map_err(|e| PriceFetchError::InvalidProxyAddress(e.to_string()))?;

        let client = Client::builder()
            .proxy(proxy)
            .default_headers(browser_headers())
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| PriceFetchError::SessionBuild(e.to_string()))?;

        debug!("Built session via {}", config.address());
        Ok(Box::new(HttpSession { client }))
    }

    #[instrument(skip(self, timeout))]
    async fn request_rotation(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<RotationResponse> {
        let response = self
            .direct
            .get(endpoint)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(RotationResponse { status, body })
    }
}

fn map_request_error(err: reqwest::Error) -> PriceFetchError {
    if err.is_timeout() {
        PriceFetchError::Timeout
    } else {
        PriceFetchError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert!(headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ua| ua.contains("Chrome/120")));
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "navigate");
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7");
        // Left to reqwest so responses are decompressed transparently
        assert!(headers.get(reqwest::header::ACCEPT_ENCODING).is_none());
    }

    #[test]
    fn test_http_connector_builds_proxied_session() {
        let connector = HttpConnector::new().unwrap();
        let config = ProxyConfig::new(
            "127.0.0.1",
            3128,
            "user",
            "pass",
            "http://127.0.0.1:9/rotate",
        );
        assert!(connector.build_session(&config).is_ok());
    }
}
