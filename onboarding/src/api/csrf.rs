// Anti-forgery token
//
// Read once when the page loads and attached to every request afterwards.

use regex::Regex;
use std::sync::OnceLock;

pub const CSRF_HEADER: &str = "X-CSRFToken";

static META_RE: OnceLock<Option<Regex>> = OnceLock::new();

#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        CsrfToken(value.into())
    }

    /// Extracts `<meta name="csrf-token" content="...">` from a page.
    pub fn from_meta(html: &str) -> Option<Self> {
        let re = META_RE
            .get_or_init(|| {
                Regex::new(
                    r#"<meta\s+[^>]*name\s*=\s*["']csrf-token["'][^>]*content\s*=\s*["']([^"']*)["']|<meta\s+[^>]*content\s*=\s*["']([^"']*)["'][^>]*name\s*=\s*["']csrf-token["']"#,
                )
                .ok()
            })
            .as_ref()?;
        let caps = re.captures(html)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(CsrfToken::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// Never print the raw token.
impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CsrfToken({})",
            crate::utils::logging::mask_sensitive(&self.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_meta_reads_token_in_either_attribute_order() {
        let html = r#"<head><meta name="csrf-token" content="IjA5ZmQ3"></head>"#;
        assert_eq!(CsrfToken::from_meta(html).unwrap().as_str(), "IjA5ZmQ3");

        let html = r#"<meta content='tok-123' name='csrf-token'>"#;
        assert_eq!(CsrfToken::from_meta(html).unwrap().as_str(), "tok-123");
    }

    #[test]
    fn from_meta_ignores_missing_or_empty_token() {
        assert!(CsrfToken::from_meta("<meta name=\"viewport\" content=\"x\">").is_none());
        assert!(CsrfToken::from_meta("<meta name=\"csrf-token\" content=\"\">").is_none());
    }

    #[test]
    fn debug_output_masks_token() {
        let token = CsrfToken::new("abcdefghijklmnop");
        let shown = format!("{:?}", token);
        assert!(!shown.contains("abcdefghijklmnop"), "{}", shown);
    }
}
