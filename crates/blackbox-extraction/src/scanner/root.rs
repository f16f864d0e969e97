//! Metadata-root resolution.

use std::path::{Path, PathBuf};

use blackbox_core::constants::{METADATA_ROOT_DIR, PROJECT_DESCRIPTOR};
use blackbox_core::errors::ScanError;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDescriptor {
    #[serde(default)]
    package_directories: Vec<PackageDirectory>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageDirectory {
    #[serde(default)]
    path: String,
}

/// Find the directory holding a project's metadata.
///
/// Tried in order: a `force-app` child, the project itself when it is named
/// `force-app`, then the first existing `packageDirectories[].path` declared
/// in `sfdx-project.json`.
pub fn resolve_root(project: &Path) -> Result<PathBuf, ScanError> {
    let direct = project.join(METADATA_ROOT_DIR);
    if direct.is_dir() {
        return Ok(direct);
    }

    if project.is_dir() && project.file_name().is_some_and(|name| name == METADATA_ROOT_DIR) {
        return Ok(project.to_path_buf());
    }

    if let Some(package_dir) = declared_package_directory(project) {
        return Ok(package_dir);
    }

    Err(ScanError::RootNotFound {
        path: project.to_path_buf(),
    })
}

/// An unreadable or malformed descriptor counts as no declaration.
fn declared_package_directory(project: &Path) -> Option<PathBuf> {
    let descriptor_path = project.join(PROJECT_DESCRIPTOR);
    let text = std::fs::read_to_string(&descriptor_path).ok()?;
    let descriptor: ProjectDescriptor = match serde_json::from_str(&text) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(
                path = %descriptor_path.display(),
                error = %e,
                "ignoring malformed project descriptor"
            );
            return None;
        }
    };
    descriptor
        .package_directories
        .iter()
        .map(|pkg| project.join(&pkg.path))
        .find(|dir| dir.is_dir())
}
