//! Brand detection configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for brand detection and scrubbing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BrandConfig {
    /// Terms always scrubbed, registered before auto-detection.
    pub custom_terms: Vec<String>,
    /// Company-name dictionary file. Default: `~/.blackbox/company_names.txt`.
    pub dictionary_path: Option<PathBuf>,
    /// Skip the dictionary strategy entirely. Default: false.
    pub disable_dictionary: Option<bool>,
    /// TOML file replacing the built-in stoplists.
    pub stoplists_path: Option<PathBuf>,
    /// Words added to the built-in structural stoplist.
    pub extra_structural_words: Vec<String>,
    /// Products added to the built-in ecosystem stoplist.
    pub extra_ecosystem_products: Vec<String>,
}

impl BrandConfig {
    pub fn effective_disable_dictionary(&self) -> bool {
        self.disable_dictionary.unwrap_or(false)
    }

    /// Configured dictionary path, else the per-user default location.
    pub fn effective_dictionary_path(&self) -> Option<PathBuf> {
        self.dictionary_path
            .clone()
            .or_else(|| super::blackbox_config::user_dir().map(|d| d.join("company_names.txt")))
    }
}
