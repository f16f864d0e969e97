//! Structural anonymization of strings and nested pattern structures.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::LazyLock;

use blackbox_core::constants::MIN_ANONYMIZE_LEN;

use super::patterns::{RE_AMOUNT, RE_EMAIL, RE_IPV4, RE_RECORD_ID, RE_URL};
use super::references::extract_field_refs_from_formula;
use super::BrandScrubber;

/// Keys whose string values are free text and get replaced wholesale.
const FREE_TEXT_KEYS: &[&str] = &[
    "errorMessage",
    "description",
    "label",
    "helpText",
    "inputText",
    "outputText",
    "choiceText",
    "interviewLabel",
];

/// Two-character prefixes of custom-object record ids.
const CUSTOM_ID_PREFIXES: &[&str] = &["a0", "a1", "a2", "a3"];

/// Applies redaction and brand scrubbing using one scan's scrubber.
#[derive(Debug, Clone, Copy)]
pub struct StructuralAnonymizer<'a> {
    scrubber: &'a BrandScrubber,
}

impl<'a> StructuralAnonymizer<'a> {
    pub fn new(scrubber: &'a BrandScrubber) -> Self {
        Self { scrubber }
    }

    pub fn scrubber(&self) -> &'a BrandScrubber {
        self.scrubber
    }

    /// Redact record ids, emails, URLs, IPv4 addresses and currency amounts,
    /// in that order, then brand-scrub. Strings under 3 chars pass through.
    pub fn anonymize_string(&self, value: &str) -> String {
        if value.chars().count() < MIN_ANONYMIZE_LEN {
            return value.to_string();
        }

        let mut result = match RE_RECORD_ID.as_ref() {
            Some(re) => re
                .replace_all(value, |caps: &Captures| {
                    let candidate = &caps[0];
                    if self.looks_like_record_id(candidate) {
                        "[SF_ID]".to_string()
                    } else {
                        candidate.to_string()
                    }
                })
                .into_owned(),
            None => value.to_string(),
        };
        result = replace_all(&RE_EMAIL, &result, "[EMAIL]");
        result = replace_all(&RE_URL, &result, "[URL]");
        result = replace_all(&RE_IPV4, &result, "[IP]");
        result = replace_all(&RE_AMOUNT, &result, "[AMOUNT]");

        self.scrubber.scrub(&result)
    }

    /// Brand-scrub a field API name. Suffix and segment layout are kept.
    pub fn anonymize_field_name(&self, field_name: &str) -> String {
        self.scrubber.scrub(field_name)
    }

    /// Recursively anonymize a structure.
    ///
    /// Mapping values are anonymized under their own key; sequence items
    /// inherit the key of the sequence. A string under a free-text key
    /// becomes `[KEY:NNchars]`.
    pub fn anonymize_structure(&self, node: &Value, parent_key: &str) -> Value {
        match node {
            Value::String(s) => {
                if FREE_TEXT_KEYS.contains(&parent_key) {
                    Value::String(format!(
                        "[{}:{}chars]",
                        parent_key.to_uppercase(),
                        s.chars().count()
                    ))
                } else {
                    Value::String(self.anonymize_string(s))
                }
            }
            Value::Object(map) => {
                let anonymized: Map<String, Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.anonymize_structure(v, k)))
                    .collect();
                Value::Object(anonymized)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.anonymize_structure(item, parent_key))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Field references in a formula, scrubbed with this anonymizer's scrubber.
    pub fn formula_field_refs(&self, formula: &str) -> Vec<String> {
        extract_field_refs_from_formula(formula, self.scrubber)
    }

    fn looks_like_record_id(&self, candidate: &str) -> bool {
        if !matches!(candidate.len(), 15 | 18) || !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        let prefix = &candidate[..3];
        self.scrubber.stoplists().is_record_id_prefix(prefix)
            || CUSTOM_ID_PREFIXES.contains(&&prefix[..2])
    }
}

fn replace_all(re: &LazyLock<Option<Regex>>, text: &str, placeholder: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(text, placeholder).into_owned(),
        None => text.to_string(),
    }
}
