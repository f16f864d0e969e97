//! Error handling for Blackbox.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod dictionary_error;
pub mod error_code;
pub mod extract_error;
pub mod parse_error;
pub mod scan_error;

pub use config_error::ConfigError;
pub use dictionary_error::DictionaryError;
pub use error_code::BlackboxErrorCode;
pub use extract_error::ExtractError;
pub use parse_error::ParseError;
pub use scan_error::ScanError;
