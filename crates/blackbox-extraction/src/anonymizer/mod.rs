//! Anonymization: brand detection and scrubbing, structural redaction.
//!
//! `CompanyDictionary` is process-wide and read-only. A `BrandScrubber` is
//! built per scan and handed to extractors through the extraction context.

pub mod brand;
pub mod dictionary;
pub mod patterns;
pub mod references;
pub mod stoplists;
pub mod structural;

pub use brand::BrandScrubber;
pub use dictionary::{CompanyDictionary, DictionaryStats};
pub use references::extract_field_refs_from_formula;
pub use stoplists::Stoplists;
pub use structural::StructuralAnonymizer;
