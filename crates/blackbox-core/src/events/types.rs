//! Event payloads.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Scan lifecycle phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Discover,
    BrandDetect,
    Extract,
    PostScrub,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStartedEvent {
    pub root: PathBuf,
    pub source_id: String,
}

/// Emitted at phase boundaries and every `progress_interval` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgressEvent {
    pub phase: ScanPhase,
    pub processed: usize,
    pub total: usize,
    pub patterns_found: usize,
    pub current_file: String,
}

impl ScanProgressEvent {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanCompleteEvent {
    pub source_id: String,
    pub total_files: usize,
    pub patterns_found: usize,
    pub brands_detected: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanErrorEvent {
    pub file: Option<String>,
    pub message: String,
}
