//! Randomized pauses between requests

use std::time::Duration;

use rand::Rng;

use crate::error::{PriceFetchError, Result};

/// Uniform random duration in `[min, max]`
///
/// Callers keep `min <= max`; a reversed pair is swapped rather than panicking.
pub fn random_between(min: Duration, max: Duration) -> Duration {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rand::thread_rng().gen_range(low..=high)
}

/// Inter-request delay window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(PriceFetchError::InvalidConfig(format!(
                "delay min ({:.1}s) exceeds max ({:.1}s)",
                min.as_secs_f64(),
                max.as_secs_f64()
            )));
        }
        Ok(Self { min, max })
    }

    /// Window in (possibly fractional) seconds
    pub fn from_secs_f64(min: f64, max: f64) -> Result<Self> {
        let to_duration = |secs: f64| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                PriceFetchError::InvalidConfig(format!("invalid delay: {}", secs))
            })
        };
        Self::new(to_duration(min)?, to_duration(max)?)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn sample(&self) -> Duration {
        random_between(self.min, self.max)
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(4),
            max: Duration::from_secs(8),
        }
    }
}
