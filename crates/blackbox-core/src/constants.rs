//! Shared constants for the Blackbox extraction engine.

/// Blackbox version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum metadata file size in bytes for scanning (default: 4MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 4_194_304;

/// Number of processed files between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// Length of the hex source hash attached to every pattern.
pub const SOURCE_HASH_LEN: usize = 12;

/// Strings shorter than this are never anonymized.
pub const MIN_ANONYMIZE_LEN: usize = 3;

/// Minimum length for a company-dictionary match.
pub const MIN_DICTIONARY_MATCH_LEN: usize = 4;

/// Project config file name, looked up in the scanned project root.
pub const PROJECT_CONFIG_FILE: &str = "blackbox.toml";

/// Conventional metadata root directory name.
pub const METADATA_ROOT_DIR: &str = "force-app";

/// Project descriptor declaring package directories.
pub const PROJECT_DESCRIPTOR: &str = "sfdx-project.json";

/// Source object used when none can be detected.
pub const UNKNOWN_OBJECT: &str = "Unknown";
