//! Anti-bot block detection
//!
//! Classifies a response body as a block/CAPTCHA page. Errs on the side of
//! reporting a block: a missed block costs a wasted retry cycle later.

/// Phrases that only show up on block, CAPTCHA or access-restricted pages
const BLOCK_INDICATORS: &[&str] = &[
    "Доступ ограничен",
    "не бот",
    "Подтвердите, что вы не робот",
    "captcha",
    "robot",
];

/// Returns true when the body looks like an anti-bot rejection
pub fn is_blocked(body: &str) -> bool {
    let body = body.to_lowercase();
    BLOCK_INDICATORS
        .iter()
        .any(|indicator| body.contains(&indicator.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captcha_alone_is_blocked() {
        assert!(is_blocked("captcha"));
    }

    #[test]
    fn test_case_insensitive_match() {
        assert!(is_blocked("<title>CAPTCHA required</title>"));
        assert!(is_blocked("<h1>ДОСТУП ОГРАНИЧЕН</h1>"));
        assert!(is_blocked("Подтвердите, что вы не робот"));
        assert!(is_blocked("Are you a Robot?"));
    }

    #[test]
    fn test_ordinary_page_is_not_blocked() {
        let body = r#"<html><head><title>Смазка литиевая</title></head>
            <body><div data-widget="webPrice"><span>1 234 ₽</span></div>
            <p>Доставка завтра</p></body></html>"#;
        assert!(!is_blocked(body));
    }

    #[test]
    fn test_empty_body_is_not_blocked() {
        assert!(!is_blocked(""));
    }
}
