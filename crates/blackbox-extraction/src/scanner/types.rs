//! Scanner data types: ScanProgress, ScanResult, DiscoveredFile.

use std::collections::BTreeMap;
use std::path::PathBuf;

use blackbox_core::events::{ScanPhase, ScanProgressEvent};
use blackbox_core::types::ExtractedPattern;
use serde::Serialize;

use crate::extractors::MetadataKind;

/// Running counters for one scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanProgress {
    pub total_files: usize,
    pub processed_files: usize,
    pub patterns_found: usize,
    /// Path of the file being processed, relative to the project. Reported
    /// verbatim, brand-bearing directory and file names included.
    pub current_file: String,
    /// Processed files per metadata kind.
    pub metadata_counts: BTreeMap<String, usize>,
    pub errors: Vec<String>,
}

impl ScanProgress {
    pub fn percent(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.processed_files as f64 / self.total_files as f64 * 100.0
        }
    }

    pub(crate) fn count_kind(&mut self, kind: MetadataKind) {
        *self.metadata_counts.entry(kind.as_str().to_string()).or_insert(0) += 1;
    }

    pub(crate) fn to_event(&self, phase: ScanPhase) -> ScanProgressEvent {
        ScanProgressEvent {
            phase,
            processed: self.processed_files,
            total: self.total_files,
            patterns_found: self.patterns_found,
            current_file: self.current_file.clone(),
        }
    }
}

/// The output of one project scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Project identifier: the project directory name.
    pub source_id: String,
    pub source_hash: String,
    pub project_path: PathBuf,
    pub patterns: Vec<ExtractedPattern>,
    pub progress: ScanProgress,
}

impl ScanResult {
    pub fn error_count(&self) -> usize {
        self.progress.errors.len()
    }
}

/// A classified file found during discovery.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub kind: MetadataKind,
    pub file_size: u64,
}
