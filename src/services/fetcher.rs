//! Per-identifier fetch: request, block check, one recovery retry, extraction

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::delay::random_between;
use crate::detect::is_blocked;
use crate::error::{PriceFetchError, Result};
use crate::extract::{extract_from_api, extract_from_page};
use crate::models::{FetchErrorKind, FetchMode, FetchResult, TargetSite};
use crate::proxy::ProxySessionManager;

/// Timings for a single identifier
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub request_timeout: Duration,
    /// Pause when the rotation attempt after a block streak fails
    pub rotation_failure_pause: Duration,
    pub retry_jitter_min: Duration,
    pub retry_jitter_max: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            rotation_failure_pause: Duration::from_secs(5),
            retry_jitter_min: Duration::from_secs(3),
            retry_jitter_max: Duration::from_secs(6),
        }
    }
}

/// Drives identifiers through the proxy session one at a time
pub struct FetchOrchestrator {
    manager: ProxySessionManager,
    target: TargetSite,
    mode: FetchMode,
    policy: FetchPolicy,
}

impl FetchOrchestrator {
    pub fn new(
        manager: ProxySessionManager,
        target: TargetSite,
        mode: FetchMode,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            manager,
            target,
            mode,
            policy,
        }
    }

    /// Fetch one identifier; failures are folded into the result
    ///
    /// A blocked first response gets exactly one retry on a fresh session.
    /// Only the first response of each identifier counts toward the block
    /// streak that triggers rotation.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub async fn fetch(&mut self, identifier: &str) -> FetchResult {
        let url = self.target.url_for(identifier, self.mode);

        let mut body = match self.fetch_body(&url).await {
            Ok(body) => body,
            Err(e) => return FetchResult::failed(identifier, error_kind(&e)),
        };

        if is_blocked(&body) {
            let streak = self.manager.record_block();
            warn!("Blocked ({} in a row), retrying once", streak);
            self.recover_from_block(streak).await;

            body = match self.fetch_body(&url).await {
                Ok(body) => body,
                Err(e) => return FetchResult::failed(identifier, error_kind(&e)),
            };
            if is_blocked(&body) {
                warn!("Blocked again after retry");
                return FetchResult::failed(identifier, FetchErrorKind::BlockedAfterRetry);
            }
        }
        self.manager.record_clean();

        match self.extract(&body) {
            Some(price) => {
                debug!("Price found: {}", price);
                FetchResult::found(identifier, price)
            }
            None => FetchResult::failed(identifier, FetchErrorKind::PriceNotFound),
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        self.manager.get(url, self.policy.request_timeout).await
    }

    /// Rotate if the streak is long enough, then start over on a new session
    async fn recover_from_block(&mut self, streak: u32) {
        if streak >= self.manager.block_threshold() {
            if self.manager.rotate_ip(false, true).await {
                let pause = self.manager.rotation_state().post_rotation_pause();
                info!("Rotated, pausing {}s", pause.as_secs());
                sleep(pause).await;
            } else {
                sleep(self.policy.rotation_failure_pause).await;
            }
        }

        if let Err(e) = self.manager.reset_session() {
            warn!("Session reset failed, keeping the current one: {}", e);
        }

        sleep(random_between(
            self.policy.retry_jitter_min,
            self.policy.retry_jitter_max,
        ))
        .await;
    }

    fn extract(&self, body: &str) -> Option<String> {
        match self.mode {
            FetchMode::Page => extract_from_page(body),
            FetchMode::Api => extract_from_api(body),
        }
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn target(&self) -> &TargetSite {
        &self.target
    }

    pub fn manager(&self) -> &ProxySessionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ProxySessionManager {
        &mut self.manager
    }
}

fn error_kind(err: &PriceFetchError) -> FetchErrorKind {
    if err.is_timeout() {
        FetchErrorKind::Timeout
    } else {
        FetchErrorKind::Transport(err.to_string())
    }
}
