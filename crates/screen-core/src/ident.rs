//! Screen identifier recognition (`PREFIX-NN_NN_NN`).

use regex::Regex;
use std::sync::LazyLock;

/// A whole string that is exactly one screen id (any case).
static EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z]+-\d{2}_\d{2}_\d{2}$").expect("valid screen id regex")
});

/// A screen id at the start of a container name (upper-case prefix only).
static LEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]+-\d{2}_\d{2}_\d{2})").expect("valid screen id regex")
});

/// A screen id anywhere in free text, bounded by non-word characters.
static EMBEDDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+-\d{2}_\d{2}_\d{2})\b").expect("valid screen id regex")
});

/// Whether `text` (trimmed) is nothing but a screen id.
pub fn is_screen_id(text: &str) -> bool {
    EXACT.is_match(text.trim())
}

/// The screen id a container name starts with, if any.
pub fn leading_screen_id(name: &str) -> Option<&str> {
    LEADING
        .captures(name.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First screen id mentioned in a free-text query, upper-cased.
pub fn find_screen_id(text: &str) -> Option<String> {
    EMBEDDED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_screen_id() {
        assert!(is_screen_id("CONT-05_04_54"));
        assert!(is_screen_id(" cont-05_04_54 "));
        assert!(!is_screen_id("CONT-05_04_54 Login"));
        assert!(!is_screen_id("CONT-5_04_54"));
    }

    #[test]
    fn test_leading_screen_id() {
        assert_eq!(leading_screen_id("CONT-01_02_03 - Login"), Some("CONT-01_02_03"));
        assert_eq!(leading_screen_id("Login CONT-01_02_03"), None);
        assert_eq!(leading_screen_id("cont-01_02_03"), None);
    }

    #[test]
    fn test_find_screen_id_normalizes_case() {
        assert_eq!(
            find_screen_id("show me cont-05_04_54 please"),
            Some("CONT-05_04_54".to_string())
        );
        assert_eq!(find_screen_id("user list"), None);
    }
}
