//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, BlackboxErrorCode};

/// Errors that abort a whole project scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("No force-app directory found in {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("IO error scanning {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scan cancelled")]
    Cancelled,
}

impl BlackboxErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootNotFound { .. } => error_code::ROOT_NOT_FOUND,
            Self::Cancelled => error_code::CANCELLED,
            Self::Io { .. } => error_code::SCAN_ERROR,
        }
    }
}
