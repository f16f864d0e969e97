//! Configuration system for Blackbox.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod blackbox_config;
pub mod brand_config;
pub mod scan_config;

pub use blackbox_config::{BlackboxConfig, ConfigOverrides};
pub use brand_config::BrandConfig;
pub use scan_config::ScanConfig;
