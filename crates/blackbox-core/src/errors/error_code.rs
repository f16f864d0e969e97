//! BlackboxErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable, machine-readable
/// code next to its human-readable message.
pub trait BlackboxErrorCode {
    /// Returns the error code string (e.g., "SCAN_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const ROOT_NOT_FOUND: &str = "ROOT_NOT_FOUND";
pub const CANCELLED: &str = "CANCELLED";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const EXTRACTOR_FAULT: &str = "EXTRACTOR_FAULT";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DICTIONARY_ERROR: &str = "DICTIONARY_ERROR";
