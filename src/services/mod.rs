//! Fetch pipeline services

pub mod batch;
pub mod delay;
pub mod fetcher;

pub use batch::{BatchRunner, ProbePolicy};
pub use delay::{random_between, DelayRange};
pub use fetcher::{FetchOrchestrator, FetchPolicy};
