use serde::{Serialize, Serializer};

/// Tag written into every result record and the batch summary
pub const SOURCE_TAG: &str = "http_parser";

/// Why a single identifier produced no price
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Blocked on the first request and again on the single retry
    BlockedAfterRetry,
    /// Page or payload arrived clean but no strategy found a price
    PriceNotFound,
    /// Request exceeded its timeout
    Timeout,
    /// Proxy probe failed on every attempt before the batch started
    NoWorkingProxy,
    /// Any other transport failure, carrying its description
    Transport(String),
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            FetchErrorKind::BlockedAfterRetry => "blocked_after_retry",
            FetchErrorKind::PriceNotFound => "price_not_found",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::NoWorkingProxy => "no_working_proxy",
            FetchErrorKind::Transport(description) => description,
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for FetchErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome for one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    #[serde(rename = "sku")]
    pub identifier: String,
    pub price: Option<String>,
    pub success: bool,
    pub error: Option<FetchErrorKind>,
    pub source: &'static str,
}

impl FetchResult {
    pub fn found(identifier: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            price: Some(price.into()),
            success: true,
            error: None,
            source: SOURCE_TAG,
        }
    }

    pub fn failed(identifier: impl Into<String>, error: FetchErrorKind) -> Self {
        Self {
            identifier: identifier.into(),
            price: None,
            success: false,
            error: Some(error),
            source: SOURCE_TAG,
        }
    }
}

/// Aggregated counts for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Ordered results of a whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    results: Vec<FetchResult>,
    summary: BatchSummary,
}

impl BatchOutcome {
    pub fn new(results: Vec<FetchResult>) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            results,
            summary: BatchSummary {
                total,
                successful,
                failed: total - successful,
            },
        }
    }

    pub fn results(&self) -> &[FetchResult] {
        &self.results
    }

    pub fn summary(&self) -> BatchSummary {
        self.summary
    }

    pub fn total(&self) -> usize {
        self.summary.total
    }

    pub fn successful(&self) -> usize {
        self.summary.successful
    }

    pub fn failed(&self) -> usize {
        self.summary.failed
    }

    /// True when at least one identifier produced a price
    pub fn success(&self) -> bool {
        self.summary.successful > 0
    }
}

impl Serialize for BatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("BatchOutcome", 4)?;
        state.serialize_field("success", &self.success())?;
        state.serialize_field("results", &self.results)?;
        state.serialize_field("summary", &self.summary)?;
        state.serialize_field("source", SOURCE_TAG)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_kind_strings() {
        assert_eq!(FetchErrorKind::BlockedAfterRetry.as_str(), "blocked_after_retry");
        assert_eq!(FetchErrorKind::PriceNotFound.as_str(), "price_not_found");
        assert_eq!(FetchErrorKind::Timeout.as_str(), "timeout");
        assert_eq!(FetchErrorKind::NoWorkingProxy.as_str(), "no_working_proxy");
        assert_eq!(
            FetchErrorKind::Transport("connection reset".into()).to_string(),
            "connection reset"
        );
    }

    #[test]
    fn test_batch_outcome_counts() {
        let outcome = BatchOutcome::new(vec![
            FetchResult::found("1", "100 ₽"),
            FetchResult::failed("2", FetchErrorKind::Timeout),
            FetchResult::failed("3", FetchErrorKind::PriceNotFound),
        ]);

        assert_eq!(outcome.total(), 3);
        assert_eq!(outcome.successful(), 1);
        assert_eq!(outcome.failed(), 2);
        assert!(outcome.success());
        assert_eq!(outcome.results()[1].identifier, "2");
    }

    #[test]
    fn test_batch_outcome_all_failed_is_not_success() {
        let outcome = BatchOutcome::new(vec![FetchResult::failed(
            "1",
            FetchErrorKind::NoWorkingProxy,
        )]);
        assert!(!outcome.success());
    }

    #[test]
    fn test_batch_outcome_serialization_shape() {
        let outcome = BatchOutcome::new(vec![
            FetchResult::found("111", "1 234 ₽"),
            FetchResult::failed("222", FetchErrorKind::BlockedAfterRetry),
        ]);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "results": [
                    {"sku": "111", "price": "1 234 ₽", "success": true, "error": null, "source": "http_parser"},
                    {"sku": "222", "price": null, "success": false, "error": "blocked_after_retry", "source": "http_parser"}
                ],
                "summary": {"total": 2, "successful": 1, "failed": 1},
                "source": "http_parser"
            })
        );
    }
}
