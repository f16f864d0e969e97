//! Scanner subsystem: metadata-root resolution, file discovery and
//! classification, and the four-phase scan pipeline.
//!
//! The scanner is the entry point to the whole engine. It walks one project,
//! configures a per-scan `BrandScrubber` from the project's field corpus,
//! dispatches every classified file to its extractor and re-scrubs the
//! results once every brand term is known.

pub mod classify;
pub mod hasher;
pub mod projects;
pub mod root;
pub mod scanner;
pub mod types;

pub use classify::classify;
pub use projects::{list_projects, ProjectInfo};
pub use root::resolve_root;
pub use scanner::ProjectScanner;
pub use types::{DiscoveredFile, ScanProgress, ScanResult};
