//! Company dictionary errors.

use std::path::PathBuf;

use super::error_code::{self, BlackboxErrorCode};

/// Errors raised while reading a company-name dictionary file.
///
/// A missing file is not an error: callers fall back to an empty dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("IO error reading dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BlackboxErrorCode for DictionaryError {
    fn error_code(&self) -> &'static str {
        error_code::DICTIONARY_ERROR
    }
}
