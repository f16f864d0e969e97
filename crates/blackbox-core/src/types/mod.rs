//! Shared types: pattern records, categories, collections.

pub mod collections;
pub mod pattern;

pub use pattern::{ExtractedPattern, PatternCategory, PatternType};
