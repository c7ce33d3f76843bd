//! Price extraction from response bodies
//!
//! Two body shapes are supported:
//! - rendered product pages (HTML)
//! - entrypoint API payloads (JSON, possibly with JSON re-embedded in strings)
//!
//! Both extractors are pure and total: a missing price is `None`, never an error.

mod api;
mod page;

pub use api::{extract_from_api, find_card_price, MAX_SEARCH_DEPTH};
pub use page::extract_from_page;

/// Currency marker used by the target site
pub const CURRENCY_MARKER: char = '₽';

/// True when `text` carries both a digit and the currency marker
fn looks_like_price(text: &str) -> bool {
    text.contains(CURRENCY_MARKER) && text.chars().any(|c| c.is_ascii_digit())
}
