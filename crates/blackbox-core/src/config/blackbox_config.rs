//! Top-level Blackbox configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{BrandConfig, ScanConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (`ConfigOverrides`)
/// 2. Environment variables (`BLACKBOX_*`)
/// 3. Project config (`blackbox.toml` in the project root)
/// 4. User config (`~/.blackbox/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BlackboxConfig {
    pub scan: ScanConfig,
    pub brand: BrandConfig,
}

/// Caller-supplied overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub scan_max_file_size: Option<u64>,
    pub scan_progress_interval: Option<usize>,
    pub brand_custom_terms: Option<Vec<String>>,
    pub brand_dictionary_path: Option<PathBuf>,
    pub brand_disable_dictionary: Option<bool>,
}

impl BlackboxConfig {
    /// Load configuration for the project at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(o) = overrides {
            Self::apply_overrides(&mut config, o);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(config: &BlackboxConfig) -> Result<(), ConfigError> {
        if config.scan.max_file_size == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.max_file_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.scan.progress_interval == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.progress_interval".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(term) = config.brand.custom_terms.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed {
                field: "brand.custom_terms".to_string(),
                message: format!("blank term {term:?} is not allowed"),
            });
        }
        Ok(())
    }

    /// Path of the user-level config file: `~/.blackbox/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        user_dir().map(|d| d.join("config.toml"))
    }

    fn merge_toml_file(config: &mut BlackboxConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let layer: BlackboxConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::merge(config, &layer);
        Ok(())
    }

    /// Merge `other` into `base`. Set values in `other` win; list values
    /// replace only when non-empty.
    pub fn merge(base: &mut BlackboxConfig, other: &BlackboxConfig) {
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if other.scan.progress_interval.is_some() {
            base.scan.progress_interval = other.scan.progress_interval;
        }

        if !other.brand.custom_terms.is_empty() {
            base.brand.custom_terms = other.brand.custom_terms.clone();
        }
        if other.brand.dictionary_path.is_some() {
            base.brand.dictionary_path = other.brand.dictionary_path.clone();
        }
        if other.brand.disable_dictionary.is_some() {
            base.brand.disable_dictionary = other.brand.disable_dictionary;
        }
        if other.brand.stoplists_path.is_some() {
            base.brand.stoplists_path = other.brand.stoplists_path.clone();
        }
        if !other.brand.extra_structural_words.is_empty() {
            base.brand.extra_structural_words = other.brand.extra_structural_words.clone();
        }
        if !other.brand.extra_ecosystem_products.is_empty() {
            base.brand.extra_ecosystem_products = other.brand.extra_ecosystem_products.clone();
        }
    }

    /// Pattern: `BLACKBOX_SCAN_MAX_FILE_SIZE`, `BLACKBOX_BRAND_CUSTOM_TERMS`, etc.
    fn apply_env_overrides(config: &mut BlackboxConfig) {
        if let Ok(val) = std::env::var("BLACKBOX_SCAN_MAX_FILE_SIZE") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.max_file_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLACKBOX_SCAN_PROGRESS_INTERVAL") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.progress_interval = Some(v);
            }
        }
        if let Ok(val) = std::env::var("BLACKBOX_BRAND_CUSTOM_TERMS") {
            let terms: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if !terms.is_empty() {
                config.brand.custom_terms = terms;
            }
        }
        if let Ok(val) = std::env::var("BLACKBOX_BRAND_DICTIONARY_PATH") {
            config.brand.dictionary_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("BLACKBOX_BRAND_DISABLE_DICTIONARY") {
            if let Ok(v) = val.parse::<bool>() {
                config.brand.disable_dictionary = Some(v);
            }
        }
    }

    fn apply_overrides(config: &mut BlackboxConfig, o: &ConfigOverrides) {
        if let Some(v) = o.scan_max_file_size {
            config.scan.max_file_size = Some(v);
        }
        if let Some(v) = o.scan_progress_interval {
            config.scan.progress_interval = Some(v);
        }
        if let Some(ref v) = o.brand_custom_terms {
            config.brand.custom_terms = v.clone();
        }
        if let Some(ref v) = o.brand_dictionary_path {
            config.brand.dictionary_path = Some(v.clone());
        }
        if let Some(v) = o.brand_disable_dictionary {
            config.brand.disable_dictionary = Some(v);
        }
    }
}

/// The user-level blackbox directory: `~/.blackbox/`.
pub(crate) fn user_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|h| PathBuf::from(h).join(".blackbox"))
}
