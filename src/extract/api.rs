use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::looks_like_price;

/// Deepest nesting level the recursive search will inspect
pub const MAX_SEARCH_DEPTH: usize = 5;

/// Field names carrying the card price, in priority order
const CARD_PRICE_KEYS: &[&str] = &["cardPrice", "ozonCardPrice"];

/// Container whose values may be JSON documents serialized into strings
const WIDGET_STATES_KEY: &str = "widgetStates";

static CARD_PRICE_FIELDS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#""cardPrice"\s*:\s*"([^"]+)""#).expect("valid regex"),
        Regex::new(r#""ozonCardPrice"\s*:\s*"([^"]+)""#).expect("valid regex"),
        Regex::new(r#"cardPrice["\s:]+([^",}]+)"#).expect("valid regex"),
    ]
});

/// Extract the card price from an entrypoint API payload
///
/// A direct field match on the raw text is tried first; only when none of the
/// patterns yields a plausible price is the payload parsed and searched.
pub fn extract_from_api(body: &str) -> Option<String> {
    for pattern in CARD_PRICE_FIELDS.iter() {
        let Some(value) = pattern.captures(body).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let price = value.as_str().trim();
        if looks_like_price(price) {
            return Some(price.to_string());
        }
    }

    let data: Value = serde_json::from_str(body).ok()?;
    find_card_price(&data)
}

/// Search a JSON tree for a card price, descending at most [`MAX_SEARCH_DEPTH`] levels
pub fn find_card_price(value: &Value) -> Option<String> {
    search(value, 0)
}

fn search(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => {
            for key in CARD_PRICE_KEYS {
                if let Some(Value::String(price)) = map.get(*key) {
                    if !price.is_empty() {
                        return Some(price.clone());
                    }
                }
            }

            if let Some(Value::Object(states)) = map.get(WIDGET_STATES_KEY) {
                let found = states.values().find_map(|state| match state {
                    Value::String(raw) => serde_json::from_str::<Value>(raw)
                        .ok()
                        .and_then(|parsed| search(&parsed, depth + 1)),
                    Value::Object(_) => search(state, depth + 1),
                    _ => None,
                });
                if found.is_some() {
                    return found;
                }
            }

            map.iter()
                .filter(|(key, _)| key.as_str() != WIDGET_STATES_KEY)
                .find_map(|(_, child)| search(child, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|item| search(item, depth + 1)),
        _ => None,
    }
}
