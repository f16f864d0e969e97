//! Extractor errors.

use super::error_code::{self, BlackboxErrorCode};
use super::ParseError;

/// Errors raised by a single extractor for a single file.
///
/// Both variants are recovered at the dispatch boundary: the scan records
/// the message and moves on to the next file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("extractor '{extractor}' failed: {message}")]
    Fault {
        extractor: &'static str,
        message: String,
    },
}

impl BlackboxErrorCode for ExtractError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => error_code::PARSE_ERROR,
            Self::Fault { .. } => error_code::EXTRACTOR_FAULT,
        }
    }
}
