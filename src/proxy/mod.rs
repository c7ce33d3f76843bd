//! Proxy session layer
//!
//! This module provides:
//! - Browser-impersonating HTTP sessions routed through the residential proxy
//! - Exit-IP rotation with cooldown and block-streak tracking
//! - Health probing of the target site through the proxy

pub mod manager;
pub mod state;
pub mod transport;

pub use manager::ProxySessionManager;
pub use state::{RotationPolicy, RotationState};
pub use transport::{browser_headers, Connector, HttpConnector, RotationResponse, Session};
