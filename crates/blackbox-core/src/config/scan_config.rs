//! Scanner configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_PROGRESS_INTERVAL};

/// Configuration for project scanning.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Files larger than this many bytes are skipped. Default: 4MB.
    pub max_file_size: Option<u64>,
    /// Files processed between progress notifications. Default: 50.
    pub progress_interval: Option<usize>,
}

impl ScanConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    /// Never zero, even for configs that skipped validation.
    pub fn effective_progress_interval(&self) -> usize {
        self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL).max(1)
    }
}
