//! Format extractors: one per metadata kind, behind a single trait.
//!
//! The scanner classifies each file into a [`MetadataKind`] and dispatches
//! through [`extractor_for`]. Extractors read the file, compute complexity
//! factors, anonymize through the [`ExtractionContext`] and return zero or
//! more patterns.

pub mod apex;
pub mod common;
pub mod flow;
pub mod layout;
pub mod lwc;
pub mod object;
pub mod report;
pub mod validation;

use std::fmt;
use std::path::Path;

use blackbox_core::errors::ExtractError;
use blackbox_core::types::ExtractedPattern;
use serde::{Deserialize, Serialize};

use crate::anonymizer::{BrandScrubber, StructuralAnonymizer};

pub use common::PatternSeed;

/// The metadata formats the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    Flow,
    ValidationRule,
    Object,
    Field,
    Report,
    Layout,
    Apex,
    Lwc,
}

impl MetadataKind {
    /// Every kind, in registry order.
    pub const ALL: [MetadataKind; 8] = [
        Self::Flow,
        Self::ValidationRule,
        Self::Object,
        Self::Field,
        Self::Report,
        Self::Layout,
        Self::Apex,
        Self::Lwc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::ValidationRule => "validation_rule",
            Self::Object => "object",
            Self::Field => "field",
            Self::Report => "report",
            Self::Layout => "layout",
            Self::Apex => "apex",
            Self::Lwc => "lwc",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns one metadata file into patterns.
///
/// Returning an empty vector is a normal outcome (wrong root element, a test
/// class with no methods). Errors are recovered by the scanner.
pub trait PatternExtractor: Send + Sync {
    fn kind(&self) -> MetadataKind;

    /// Short name used in logs and fault messages.
    fn name(&self) -> &'static str;

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>)
        -> Result<Vec<ExtractedPattern>, ExtractError>;
}

/// Registry indexed by `MetadataKind` discriminant.
static EXTRACTORS: [&dyn PatternExtractor; 8] = [
    &flow::FlowExtractor,
    &validation::ValidationRuleExtractor,
    &object::ObjectExtractor,
    &object::FieldExtractor,
    &report::ReportExtractor,
    &layout::LayoutExtractor,
    &apex::ApexExtractor,
    &lwc::LwcExtractor,
];

/// The extractor registered for `kind`.
pub fn extractor_for(kind: MetadataKind) -> &'static dyn PatternExtractor {
    EXTRACTORS[kind as usize]
}

/// Per-scan state shared by every extractor call.
///
/// Holds the scan's brand scrubber read-only, so all patterns of one scan
/// are scrubbed with the same term→label mapping.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    scrubber: &'a BrandScrubber,
    source_hash: &'a str,
    root: &'a Path,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(scrubber: &'a BrandScrubber, source_hash: &'a str, root: &'a Path) -> Self {
        Self {
            scrubber,
            source_hash,
            root,
        }
    }

    pub fn scrubber(&self) -> &'a BrandScrubber {
        self.scrubber
    }

    pub fn anonymizer(&self) -> StructuralAnonymizer<'a> {
        StructuralAnonymizer::new(self.scrubber)
    }

    pub fn source_hash(&self) -> &'a str {
        self.source_hash
    }

    /// Metadata root the scan resolved to.
    pub fn root(&self) -> &'a Path {
        self.root
    }

    /// `file` relative to the metadata root, or `file` itself when it lies
    /// outside the root.
    pub fn relative_path<'p>(&self, file: &'p Path) -> &'p Path {
        file.strip_prefix(self.root).unwrap_or(file)
    }
}
