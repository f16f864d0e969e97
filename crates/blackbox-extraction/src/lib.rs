//! Blackbox extraction engine.
//!
//! Turns a metadata export into anonymized, identity-free patterns:
//! the scanner discovers and classifies files, extractors normalize each
//! format into `ExtractedPattern`s, and the anonymizer strips anything that
//! identifies the organization that produced them.

pub mod anonymizer;
pub mod complexity;
pub mod extractors;
pub mod scanner;
pub mod xml;

pub use anonymizer::{BrandScrubber, CompanyDictionary, Stoplists, StructuralAnonymizer};
pub use complexity::{ComplexityFactors, ComplexityScorer};
pub use extractors::{ExtractionContext, PatternExtractor};
pub use scanner::{ProjectScanner, ScanProgress, ScanResult};
