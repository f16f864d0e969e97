//! Compiled redaction and reference patterns.
//!
//! Patterns that fail to compile become `None` and simply never match.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! anon_pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Redaction ──────────────────────────────────────────────────────────────
anon_pattern!(RE_RECORD_ID, r"\b[a-zA-Z0-9]{15}(?:[a-zA-Z0-9]{3})?\b");
anon_pattern!(
    RE_EMAIL,
    r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b"
);
anon_pattern!(RE_URL, r#"(?i)https?://[^\s<>"']+"#);
anon_pattern!(RE_IPV4, r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b");
anon_pattern!(RE_AMOUNT, r"\$[\d,]+\.?\d*");

// ── Field references ───────────────────────────────────────────────────────
anon_pattern!(RE_CUSTOM_FIELD, r"\b(\w+__[cr])\b");
anon_pattern!(RE_GLOBAL_FIELD, r"\$\w+\.(\w+)");
anon_pattern!(RE_OBJECT_FIELD, r"\b([A-Z]\w+)\.([A-Z]\w+)\b");

// ── Brand shape ────────────────────────────────────────────────────────────
anon_pattern!(RE_NAMESPACED_FIELD, r"^(\w+)__(\w+)__[cr]$");
anon_pattern!(RE_CAMEL_TRANSITION, r"[a-z][A-Z]");
anon_pattern!(RE_CAPS_THEN_LOWER, r"[A-Z]{2,}[a-z]");

/// Whether `re` compiled and matches `text`.
pub fn is_match(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|r| r.is_match(text))
}

/// Split a camel-case token into sub-words.
///
/// A run of capitals followed by a capitalised word splits before the last
/// capital (`HTTPServer` → `HTTP`, `Server`). Any other capital starts a word
/// of its own. Digits and other characters separate words and are dropped.
pub fn split_camel_case(token: &str) -> Vec<&str> {
    let bytes = token.as_bytes();
    let mut parts = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        if bytes[i].is_ascii_uppercase() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_uppercase() {
                j += 1;
            }
            if j - i >= 2 && j < bytes.len() && bytes[j].is_ascii_lowercase() {
                // Leave the last capital to start the next word.
                i = j - 1;
            } else {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_lowercase() {
                    i += 1;
                }
            }
            parts.push(&token[start..i]);
        } else if bytes[i].is_ascii_lowercase() {
            while i < bytes.len() && bytes[i].is_ascii_lowercase() {
                i += 1;
            }
            parts.push(&token[start..i]);
        } else {
            i += 1;
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        for re in [
            &RE_RECORD_ID,
            &RE_EMAIL,
            &RE_URL,
            &RE_IPV4,
            &RE_AMOUNT,
            &RE_CUSTOM_FIELD,
            &RE_GLOBAL_FIELD,
            &RE_OBJECT_FIELD,
            &RE_NAMESPACED_FIELD,
            &RE_CAMEL_TRANSITION,
            &RE_CAPS_THEN_LOWER,
        ] {
            assert!(re.is_some());
        }
    }

    #[test]
    fn camel_case_split() {
        assert_eq!(split_camel_case("AcmeCloud"), vec!["Acme", "Cloud"]);
        assert_eq!(split_camel_case("IsAPastUser"), vec!["Is", "A", "Past", "User"]);
        assert_eq!(split_camel_case("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_camel_case("createdById"), vec!["created", "By", "Id"]);
        assert_eq!(split_camel_case("ABC"), vec!["A", "B", "C"]);
        assert_eq!(split_camel_case("mkto71Score"), vec!["mkto", "Score"]);
    }
}
