//! Pricefetch - card-price fetcher behind a rotating residential proxy
//!
//! Fetches product prices from a storefront that defends itself with
//! anti-bot pages, one identifier at a time.
//!
//! ## Features
//!
//! - Product-page and JSON API extraction with ordered fallbacks
//! - Block/CAPTCHA detection with a single retry on a fresh session
//! - Exit-IP rotation with cooldown and block-streak threshold
//! - Pre-flight proxy probing with forced rotation
//! - Randomized pacing between requests

pub mod config;
pub mod detect;
pub mod error;
pub mod extract;
pub mod models;
pub mod proxy;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{PriceFetchError, Result};
pub use models::{BatchOutcome, FetchErrorKind, FetchMode, FetchResult, ProxyConfig, TargetSite};
pub use services::{BatchRunner, FetchOrchestrator};
