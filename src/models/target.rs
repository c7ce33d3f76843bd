use super::FetchMode;

/// Default storefront
pub const DEFAULT_BASE_URL: &str = "https://www.ozon.ru";

/// Address forms of the target site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSite {
    base_url: String,
}

impl TargetSite {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Root page, used as the health probe
    pub fn root_url(&self) -> &str {
        &self.base_url
    }

    pub fn product_page_url(&self, identifier: &str) -> String {
        format!(
            "{}/product/{}/",
            self.base_url,
            urlencoding::encode(identifier.trim())
        )
    }

    pub fn api_url(&self, identifier: &str) -> String {
        format!(
            "{}/api/entrypoint-api.bx/page/json/v2?url=%2Fproduct%2F{}",
            self.base_url,
            urlencoding::encode(identifier.trim())
        )
    }

    pub fn url_for(&self, identifier: &str, mode: FetchMode) -> String {
        match mode {
            FetchMode::Page => self.product_page_url(identifier),
            FetchMode::Api => self.api_url(identifier),
        }
    }
}

impl Default for TargetSite {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_forms() {
        let site = TargetSite::default();
        assert_eq!(site.root_url(), "https://www.ozon.ru");
        assert_eq!(
            site.url_for("1234567", FetchMode::Page),
            "https://www.ozon.ru/product/1234567/"
        );
        assert_eq!(
            site.url_for("1234567", FetchMode::Api),
            "https://www.ozon.ru/api/entrypoint-api.bx/page/json/v2?url=%2Fproduct%2F1234567"
        );
    }

    #[test]
    fn test_base_url_normalized() {
        let site = TargetSite::new(" https://shop.test/ ");
        assert_eq!(site.root_url(), "https://shop.test");
        assert_eq!(site.product_page_url("42"), "https://shop.test/product/42/");
    }

    #[test]
    fn test_identifier_is_encoded() {
        let site = TargetSite::new("https://shop.test");
        assert_eq!(
            site.product_page_url("a b/c"),
            "https://shop.test/product/a%20b%2Fc/"
        );
    }
}
