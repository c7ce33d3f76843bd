//! IP rotation timing and block bookkeeping

use std::time::Duration;

use tokio::time::Instant;

/// Timings and thresholds for IP rotation
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// Minimum time between two rotations
    pub cooldown: Duration,
    /// Pause after a successful rotation before the next request
    pub post_rotation_pause: Duration,
    /// Consecutive blocks that trigger a rotation (and waiting out the cooldown)
    pub block_threshold: u32,
    /// Timeout for the rotation endpoint call
    pub rotation_timeout: Duration,
    /// Timeout for the target-site health probe
    pub probe_timeout: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(45),
            post_rotation_pause: Duration::from_secs(12),
            block_threshold: 3,
            rotation_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(30),
        }
    }
}

/// Mutable rotation bookkeeping for one proxy identity
///
/// Uses the tokio clock, which is monotonic and can be paused in tests.
#[derive(Debug, Clone)]
pub struct RotationState {
    last_rotation: Option<Instant>,
    cooldown: Duration,
    consecutive_blocks: u32,
    post_rotation_pause: Duration,
}

impl RotationState {
    pub fn new(policy: &RotationPolicy) -> Self {
        Self {
            last_rotation: None,
            cooldown: policy.cooldown,
            consecutive_blocks: 0,
            post_rotation_pause: policy.post_rotation_pause,
        }
    }

    pub fn last_rotation(&self) -> Option<Instant> {
        self.last_rotation
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn consecutive_blocks(&self) -> u32 {
        self.consecutive_blocks
    }

    pub fn post_rotation_pause(&self) -> Duration {
        self.post_rotation_pause
    }

    /// Time left before another rotation is allowed, `None` once it has elapsed
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_rotation?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.cooldown).then(|| self.cooldown - elapsed)
    }

    /// Count a detected block, returning the new streak length
    pub fn record_block(&mut self) -> u32 {
        self.consecutive_blocks = self.consecutive_blocks.saturating_add(1);
        self.consecutive_blocks
    }

    /// A clean response ends the block streak
    pub fn record_clean(&mut self) {
        self.consecutive_blocks = 0;
    }

    /// A fresh exit IP starts a new cooldown and clears the streak
    pub fn record_rotation(&mut self, at: Instant) {
        self.last_rotation = Some(at);
        self.consecutive_blocks = 0;
    }
}
