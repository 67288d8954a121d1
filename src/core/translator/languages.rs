//! Language codes accepted by the translation API.
//!
//! The API uses its own short codes (`jp`, `kor`, `fra`, ...) rather than ISO 639-1.

pub const AUTO: &str = "auto";

pub const LANGUAGES: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("en", "English"),
    ("yue", "Cantonese"),
    ("wyw", "Classical Chinese"),
    ("jp", "Japanese"),
    ("kor", "Korean"),
    ("fra", "French"),
    ("spa", "Spanish"),
    ("th", "Thai"),
    ("ara", "Arabic"),
    ("ru", "Russian"),
    ("pt", "Portuguese"),
    ("de", "German"),
    ("it", "Italian"),
    ("el", "Greek"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("bul", "Bulgarian"),
    ("est", "Estonian"),
    ("dan", "Danish"),
    ("fin", "Finnish"),
    ("cs", "Czech"),
    ("rom", "Romanian"),
    ("slo", "Slovenian"),
    ("swe", "Swedish"),
    ("hu", "Hungarian"),
    ("cht", "Traditional Chinese"),
    ("vie", "Vietnamese"),
];

/// Display name for a code, if the API knows it
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn is_supported_target(code: &str) -> bool {
    language_name(code).is_some()
}

/// Sources additionally accept `auto` detection
pub fn is_supported_source(code: &str) -> bool {
    code == AUTO || is_supported_target(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(language_name("jp"), Some("Japanese"));
        assert_eq!(language_name("ja"), None);
    }

    #[test]
    fn test_auto_is_source_only() {
        assert!(is_supported_source(AUTO));
        assert!(!is_supported_target(AUTO));
        assert!(is_supported_source("en"));
    }
}
