use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{looks_like_price, CURRENCY_MARKER};

static PRICE_WIDGET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[data-widget="webPrice"]"#).expect("valid selector"));

static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").expect("valid selector"));

static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});

/// Digits (with grouping spaces) followed by the currency marker
static PRICE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d\s]*₽").expect("valid regex"));

/// Card price: the promo phrase, then a price within 200 characters
static CARD_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)с Ozon Картой.{0,200}?(\d[\d\s]*₽)").expect("valid regex")
});

/// Last-resort patterns against the raw body, in priority order
static FALLBACK_PRICES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(\d[\d\s]*₽)").expect("valid regex"),
        Regex::new(r#"price["\s:]+(\d+)"#).expect("valid regex"),
    ]
});

/// Extract a price from a rendered product page
///
/// Strategies run in a fixed order and the first hit wins:
/// price widget, JSON-LD offer, card-price phrase, raw-body fallback.
pub fn extract_from_page(body: &str) -> Option<String> {
    let document = Html::parse_document(body);

    from_price_widget(&document)
        .or_else(|| from_ld_json(&document))
        .or_else(|| from_card_phrase(&visible_text(&document)))
        .or_else(|| from_raw_body(body))
}

fn from_price_widget(document: &Html) -> Option<String> {
    document
        .select(&PRICE_WIDGET)
        .flat_map(|widget| widget.select(&SPAN))
        .map(|span| span.text().collect::<String>())
        .filter(|text| looks_like_price(text))
        .find_map(|text| PRICE_TEXT.find(&text).map(|m| m.as_str().trim().to_string()))
}

fn from_ld_json(document: &Html) -> Option<String> {
    document.select(&LD_JSON).find_map(|script| {
        let data: Value = serde_json::from_str(&script.text().collect::<String>()).ok()?;
        let price = match data.get("offers")?.get("price")? {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(format!("{} {}", price, CURRENCY_MARKER))
    })
}

fn from_card_phrase(text: &str) -> Option<String> {
    CARD_PRICE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

// May pick up cross-sell prices; kept last so it only fires when nothing else matched.
fn from_raw_body(body: &str) -> Option<String> {
    FALLBACK_PRICES.iter().find_map(|pattern| {
        let price = pattern.captures(body)?.get(1)?.as_str().trim().to_string();
        if price.contains(CURRENCY_MARKER) {
            Some(price)
        } else {
            Some(format!("{} {}", price, CURRENCY_MARKER))
        }
    })
}

/// Text content of the page, skipping script and style bodies
fn visible_text(document: &Html) -> String {
    let mut text = String::new();
    for node in document.root_element().descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        if !hidden {
            text.push_str(chunk);
        }
    }
    text
}
