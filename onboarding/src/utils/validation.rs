// Input helpers shared by the validators and the log masking

use regex::Regex;
use std::sync::OnceLock;

static DATA_CENTER_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Region suffix of a mailing-list API key (`0123abcd-us12` → `us12`).
pub fn data_center_from_key(key: &str) -> Option<String> {
    let re = DATA_CENTER_RE
        .get_or_init(|| Regex::new(r"-([a-z]{2}\d+)\s*$").ok())
        .as_ref()?;
    re.captures(key.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Email plausibility check used on the client: an `@` and a `.` somewhere.
pub fn looks_like_email(value: &str) -> bool {
    value.contains('@') && value.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_center_is_extracted_from_key_suffix() {
        assert_eq!(
            data_center_from_key("0123456789abcdef-us12"),
            Some("us12".to_string())
        );
        assert_eq!(data_center_from_key("abc-us-123"), None);
        assert_eq!(data_center_from_key("no-suffix"), None);
    }

    #[test]
    fn data_center_pattern_is_reused_across_calls() {
        for _ in 0..3 {
            assert_eq!(data_center_from_key("k-us7"), Some("us7".to_string()));
        }
        assert!(DATA_CENTER_RE.get().is_some_and(|re| re.is_some()));
    }

    #[test]
    fn email_needs_at_and_dot() {
        assert!(looks_like_email("a@b.c"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a.b"));
    }
}
