//! Scripted network double for async tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{PriceFetchError, Result};
use crate::models::ProxyConfig;
use crate::proxy::{Connector, RotationResponse, Session};

pub const CLEAN_PAGE: &str =
    r#"<html><body><div data-widget="webPrice"><span>1 490 ₽</span></div></body></html>"#;

pub const BLOCK_PAGE: &str =
    "<html><body><h1>Доступ ограничен</h1><p>Подтвердите, что вы не робот</p><span>990 ₽</span></body></html>";

/// What a scripted GET returns
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Timeout,
    Fail,
}

impl Reply {
    pub fn body(body: &str) -> Self {
        Reply::Body(body.to_string())
    }

    fn into_result(self) -> Result<String> {
        match self {
            Reply::Body(body) => Ok(body),
            Reply::Timeout => Err(PriceFetchError::Timeout),
            Reply::Fail => Err(PriceFetchError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

/// What a scripted rotation call returns
#[derive(Debug, Clone, Copy)]
pub enum RotationReply {
    Status(u16),
    Fail,
}

#[derive(Default)]
struct Shared {
    probes: Mutex<VecDeque<Reply>>,
    fetches: Mutex<VecDeque<Reply>>,
    rotations: Mutex<VecDeque<RotationReply>>,
    requested: Mutex<Vec<String>>,
    rotation_calls: AtomicUsize,
    sessions_built: AtomicUsize,
    fail_builds: AtomicBool,
}

/// Connector serving queued replies
///
/// Product URLs (page or API) draw from the fetch queue, anything else from
/// the probe queue. Empty queues answer with [`CLEAN_PAGE`] and rotation 200.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    shared: Arc<Shared>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_probe(&self, reply: Reply) -> &Self {
        self.shared.probes.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_fetch(&self, reply: Reply) -> &Self {
        self.shared.fetches.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_rotation(&self, reply: RotationReply) -> &Self {
        self.shared.rotations.lock().unwrap().push_back(reply);
        self
    }

    pub fn fail_builds(&self, fail: bool) {
        self.shared.fail_builds.store(fail, Ordering::SeqCst);
    }

    pub fn requested(&self) -> Vec<String> {
        self.shared.requested.lock().unwrap().clone()
    }

    pub fn rotation_calls(&self) -> usize {
        self.shared.rotation_calls.load(Ordering::SeqCst)
    }

    pub fn sessions_built(&self) -> usize {
        self.shared.sessions_built.load(Ordering::SeqCst)
    }

    pub fn as_connector(&self) -> Arc<dyn Connector> {
        Arc::new(self.clone())
    }
}

struct ScriptedSession {
    shared: Arc<Shared>,
}

#[async_trait]
impl Session for ScriptedSession {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.shared.requested.lock().unwrap().push(url.to_string());

        let queue = if url.contains("product") {
            &self.shared.fetches
        } else {
            &self.shared.probes
        };
        let reply = queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::body(CLEAN_PAGE));
        reply.into_result()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    fn build_session(&self, _config: &ProxyConfig) -> Result<Box<dyn Session>> {
        if self.shared.fail_builds.load(Ordering::SeqCst) {
            return Err(PriceFetchError::SessionBuild("scripted failure".into()));
        }
        self.shared.sessions_built.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            shared: self.shared.clone(),
        }))
    }

    async fn request_rotation(
        &self,
        _endpoint: &str,
        _timeout: Duration,
    ) -> Result<RotationResponse> {
        self.shared.rotation_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .shared
            .rotations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RotationReply::Status(200));

        match reply {
            RotationReply::Status(code) => Ok(RotationResponse {
                status: StatusCode::from_u16(code).unwrap(),
                body: String::new(),
            }),
            RotationReply::Fail => Err(PriceFetchError::Timeout),
        }
    }
}

pub fn test_proxy_config() -> ProxyConfig {
    ProxyConfig::new("127.0.0.1", 3128, "user", "secret", "http://127.0.0.1:9/rotate")
}
