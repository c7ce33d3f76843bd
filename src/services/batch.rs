//! Sequential batch over many identifiers

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use super::delay::DelayRange;
use super::fetcher::FetchOrchestrator;
use crate::error::{PriceFetchError, Result};
use crate::models::{BatchOutcome, FetchErrorKind, FetchResult};

/// Pre-flight proxy probing
#[derive(Debug, Clone)]
pub struct ProbePolicy {
    pub attempts: u32,
    /// Pause between failed attempts
    pub pause: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            pause: Duration::from_secs(5),
        }
    }
}

pub struct BatchRunner {
    orchestrator: FetchOrchestrator,
    delay: DelayRange,
    probe: ProbePolicy,
}

impl BatchRunner {
    pub fn new(orchestrator: FetchOrchestrator, delay: DelayRange, probe: ProbePolicy) -> Self {
        Self {
            orchestrator,
            delay,
            probe,
        }
    }

    /// Probe the proxy, then fetch every identifier in order
    ///
    /// Results come back in input order. When no probe attempt succeeds the
    /// batch is answered with `no_working_proxy` for every identifier without
    /// fetching anything.
    pub async fn run(&mut self, identifiers: &[String]) -> Result<BatchOutcome> {
        if identifiers.is_empty() {
            return Err(PriceFetchError::NoIdentifiers);
        }

        if !self.ensure_working_proxy().await {
            error!("No working proxy, skipping {} identifiers", identifiers.len());
            let results = identifiers
                .iter()
                .map(|id| FetchResult::failed(id.as_str(), FetchErrorKind::NoWorkingProxy))
                .collect();
            return Ok(BatchOutcome::new(results));
        }

        let total = identifiers.len();
        let mut results = Vec::with_capacity(total);

        for (i, identifier) in identifiers.iter().enumerate() {
            let result = self.orchestrator.fetch(identifier).await;
            match (&result.price, &result.error) {
                (Some(price), _) => info!("[{}/{}] {}: {}", i + 1, total, identifier, price),
                (None, Some(kind)) => warn!("[{}/{}] {}: {}", i + 1, total, identifier, kind),
                (None, None) => warn!("[{}/{}] {}: no result", i + 1, total, identifier),
            }
            results.push(result);

            if i + 1 < total {
                sleep(self.delay.sample()).await;
            }
        }

        let outcome = BatchOutcome::new(results);
        info!(
            "Batch done: {}/{} priced",
            outcome.successful(),
            outcome.total()
        );
        Ok(outcome)
    }

    /// Probe up to `attempts` times, force-rotating between failures
    async fn ensure_working_proxy(&mut self) -> bool {
        for attempt in 1..=self.probe.attempts {
            if self.orchestrator.manager().check_proxy().await {
                info!("Proxy probe passed on attempt {}", attempt);
                return true;
            }
            warn!("Proxy probe {}/{} failed", attempt, self.probe.attempts);

            if attempt < self.probe.attempts {
                self.orchestrator.manager_mut().rotate_ip(true, false).await;
                sleep(self.probe.pause).await;
            }
        }
        false
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }
}
