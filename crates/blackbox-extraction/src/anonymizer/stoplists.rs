//! Word lists that separate descriptive tokens from brand-like ones.
//!
//! The built-in lists ship as `data/stoplists.toml`. A project can replace
//! them wholesale (`brand.stoplists_path`) or extend the structural and
//! ecosystem lists (`brand.extra_*`).

use std::path::Path;
use std::sync::LazyLock;

use blackbox_core::config::BrandConfig;
use blackbox_core::errors::ConfigError;
use blackbox_core::types::collections::FxHashSet;
use serde::Deserialize;

const BUILTIN_STOPLISTS: &str = include_str!("../../data/stoplists.toml");

static BUILTIN: LazyLock<Stoplists> = LazyLock::new(|| {
    Stoplists::from_toml(BUILTIN_STOPLISTS).unwrap_or_else(|e| {
        tracing::error!(error = %e, "built-in stoplists failed to parse");
        Stoplists::default()
    })
});

/// Only ecosystem names at least this long are matched as substrings.
const MIN_ECOSYSTEM_SUBSTRING_LEN: usize = 4;

/// The stoplists used by brand detection and record-id redaction.
///
/// Standard object/field names and record-id prefixes are case-sensitive.
/// Every other list is stored and compared in lowercase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Stoplists {
    standard_objects: FxHashSet<String>,
    standard_fields: FxHashSet<String>,
    ecosystem_products: FxHashSet<String>,
    structural_words: FxHashSet<String>,
    common_field_words: FxHashSet<String>,
    too_common_alone: FxHashSet<String>,
    record_id_prefixes: FxHashSet<String>,
}

impl Stoplists {
    /// The embedded lists.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parse stoplists from TOML. Lowercases the case-insensitive lists.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut lists: Stoplists = toml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: "<stoplists>".to_string(),
            message: e.to_string(),
        })?;
        lists.normalize();
        Ok(lists)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Resolve the lists a scan should use from its brand configuration.
    pub fn from_config(config: &BrandConfig) -> Result<Self, ConfigError> {
        let mut lists = match &config.stoplists_path {
            Some(path) => Self::from_file(path)?,
            None => Self::builtin(),
        };
        lists
            .structural_words
            .extend(config.extra_structural_words.iter().map(|w| w.to_lowercase()));
        lists
            .ecosystem_products
            .extend(config.extra_ecosystem_products.iter().map(|w| w.to_lowercase()));
        Ok(lists)
    }

    fn normalize(&mut self) {
        for set in [
            &mut self.ecosystem_products,
            &mut self.structural_words,
            &mut self.common_field_words,
            &mut self.too_common_alone,
        ] {
            let lowered: FxHashSet<String> = set.drain().map(|w| w.to_lowercase()).collect();
            *set = lowered;
        }
    }

    pub fn is_standard_object(&self, term: &str) -> bool {
        self.standard_objects.contains(term)
    }

    pub fn is_standard_field(&self, term: &str) -> bool {
        self.standard_fields.contains(term)
    }

    pub fn is_structural(&self, term: &str) -> bool {
        self.structural_words.contains(&term.to_lowercase())
    }

    pub fn is_common_word(&self, term: &str) -> bool {
        self.common_field_words.contains(&term.to_lowercase())
    }

    pub fn is_too_common(&self, term: &str) -> bool {
        self.too_common_alone.contains(&term.to_lowercase())
    }

    /// Exact match, or the term contains a known product name of 4+ chars
    /// (`MarketoLeadScore` contains `marketo`).
    pub fn is_ecosystem_term(&self, term: &str) -> bool {
        let lower = term.to_lowercase();
        if self.ecosystem_products.contains(&lower) {
            return true;
        }
        self.ecosystem_products
            .iter()
            .any(|eco| eco.len() >= MIN_ECOSYSTEM_SUBSTRING_LEN && lower.contains(eco.as_str()))
    }

    pub fn is_record_id_prefix(&self, prefix: &str) -> bool {
        self.record_id_prefixes.contains(prefix)
    }
}
