//! Blackbox core: shared types, errors, configuration, events, tracing and constants.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod traits;
pub mod tracing;
pub mod types;
