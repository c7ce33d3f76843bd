//! Proxy session ownership and exit-IP rotation

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument, warn};

use super::state::{RotationPolicy, RotationState};
use super::transport::{Connector, Session};
use crate::detect::is_blocked;
use crate::error::Result;
use crate::models::ProxyConfig;

/// Owns the live session, the proxy credentials and the rotation clock
pub struct ProxySessionManager {
    config: ProxyConfig,
    connector: Arc<dyn Connector>,
    session: Box<dyn Session>,
    state: RotationState,
    policy: RotationPolicy,
    probe_url: String,
}

impl ProxySessionManager {
    /// Build the first session right away so a bad proxy address fails early
    pub fn new(
        config: ProxyConfig,
        connector: Arc<dyn Connector>,
        probe_url: impl Into<String>,
        policy: RotationPolicy,
    ) -> Result<Self> {
        let session = connector.build_session(&config)?;
        debug!("Session manager ready for {}", config.address());

        Ok(Self {
            state: RotationState::new(&policy),
            config,
            connector,
            session,
            policy,
            probe_url: probe_url.into(),
        })
    }

    /// Fresh session for the current credentials
    pub fn build_session(&self) -> Result<Box<dyn Session>> {
        self.connector.build_session(&self.config)
    }

    /// Replace the live session; the old one is kept if the build fails
    pub fn reset_session(&mut self) -> Result<()> {
        self.session = self.build_session()?;
        debug!("Session reset");
        Ok(())
    }

    /// Switch to new credentials and rebuild the session
    pub fn reconfigure(&mut self, config: ProxyConfig) -> Result<()> {
        let session = self.connector.build_session(&config)?;
        info!("Proxy reconfigured to {}", config.address());
        self.config = config;
        self.session = session;
        Ok(())
    }

    pub async fn get(&self, url: &str, timeout: Duration) -> Result<String> {
        self.session.get(url, timeout).await
    }

    /// Ask the provider for a new exit IP
    ///
    /// Inside the cooldown window a non-forced rotation is skipped, unless
    /// `wait_if_cooldown` is set and the block streak has reached the
    /// threshold, in which case the rest of the cooldown is slept off first.
    #[instrument(skip(self))]
    pub async fn rotate_ip(&mut self, force: bool, wait_if_cooldown: bool) -> bool {
        if !force {
            if let Some(remaining) = self.state.cooldown_remaining(Instant::now()) {
                if wait_if_cooldown && self.state.consecutive_blocks() >= self.policy.block_threshold
                {
                    info!(
                        "Waiting {:.1}s for rotation cooldown",
                        remaining.as_secs_f64()
                    );
                    sleep(remaining).await;
                } else {
                    debug!(
                        "Rotation skipped, cooldown has {:.1}s left",
                        remaining.as_secs_f64()
                    );
                    return false;
                }
            }
        }

        let reply = self
            .connector
            .request_rotation(&self.config.rotation_endpoint, self.policy.rotation_timeout)
            .await;

        match reply {
            Ok(response) if response.status.is_success() => {
                self.state.record_rotation(Instant::now());
                info!("Exit IP rotated");
                true
            }
            Ok(response) if response.status == StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rotation rate-limited by provider");
                false
            }
            Ok(response) => {
                warn!(
                    status = %response.status,
                    body = %response.body.chars().take(200).collect::<String>(),
                    "Rotation rejected"
                );
                false
            }
            Err(e) => {
                error!("Rotation request failed: {}", e);
                false
            }
        }
    }

    /// Probe the target's root page through the current session
    #[instrument(skip(self), fields(url = %self.probe_url))]
    pub async fn check_proxy(&self) -> bool {
        match self.session.get(&self.probe_url, self.policy.probe_timeout).await {
            Ok(body) if is_blocked(&body) => {
                warn!("Probe answered with a block page");
                false
            }
            Ok(_) => {
                debug!("Probe passed");
                true
            }
            Err(e) => {
                warn!("Probe failed: {}", e);
                false
            }
        }
    }

    pub fn record_block(&mut self) -> u32 {
        self.state.record_block()
    }

    pub fn record_clean(&mut self) {
        self.state.record_clean();
    }

    pub fn consecutive_blocks(&self) -> u32 {
        self.state.consecutive_blocks()
    }

    pub fn last_rotation(&self) -> Option<Instant> {
        self.state.last_rotation()
    }

    pub fn rotation_state(&self) -> &RotationState {
        &self.state
    }

    pub fn block_threshold(&self) -> u32 {
        self.policy.block_threshold
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}
