use thiserror::Error;

/// Unified error type for the price fetcher
#[derive(Error, Debug)]
pub enum PriceFetchError {
    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    // Proxy errors
    #[error("Invalid proxy address: {0}")]
    InvalidProxyAddress(String),

    #[error("Proxy client setup failed: {0}")]
    SessionBuild(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Input errors
    #[error("No SKUs provided")]
    NoIdentifiers,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for price fetcher operations
pub type Result<T> = std::result::Result<T, PriceFetchError>;

impl PriceFetchError {
    /// Whether this error came from a request running out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            PriceFetchError::Timeout => true,
            PriceFetchError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Whether this error was caused by bad caller input or configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PriceFetchError::InvalidConfig(_)
                | PriceFetchError::MissingEnvVar(_)
                | PriceFetchError::InvalidProxyAddress(_)
                | PriceFetchError::NoIdentifiers
        )
    }
}
