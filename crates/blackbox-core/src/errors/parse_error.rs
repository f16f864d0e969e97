//! Metadata file parse errors.

use std::path::PathBuf;

use super::error_code::{self, BlackboxErrorCode};

/// Malformed input for a single file. Recovered by the scanner.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {message}")]
    MalformedXml { position: u64, message: String },

    #[error("unclosed element <{tag}>")]
    UnclosedElement { tag: String },

    #[error("document has no root element")]
    EmptyDocument,

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl BlackboxErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        error_code::PARSE_ERROR
    }
}
