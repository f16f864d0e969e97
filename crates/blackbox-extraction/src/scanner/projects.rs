//! Project discovery under a base directory.

use std::path::{Path, PathBuf};

use blackbox_core::constants::{METADATA_ROOT_DIR, PROJECT_DESCRIPTOR};
use serde::Serialize;

/// A scannable project found by [`list_projects`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub path: PathBuf,
    pub has_sfdx_config: bool,
    pub has_force_app: bool,
}

/// Immediate child directories of `base` that look like projects, sorted by
/// name. A missing or unreadable `base` yields an empty list.
pub fn list_projects(base: &Path) -> Vec<ProjectInfo> {
    let Ok(entries) = std::fs::read_dir(base) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    dirs.into_iter()
        .filter_map(|dir| {
            let has_sfdx_config = dir.join(PROJECT_DESCRIPTOR).exists();
            let has_force_app = dir.join(METADATA_ROOT_DIR).is_dir();
            if !has_sfdx_config && !has_force_app {
                return None;
            }
            Some(ProjectInfo {
                name: dir.file_name()?.to_string_lossy().into_owned(),
                path: dir,
                has_sfdx_config,
                has_force_app,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_only_projects_sorted() {
        let base = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join("zeta/force-app")).unwrap();
        fs::create_dir_all(base.path().join("alpha")).unwrap();
        fs::write(base.path().join("alpha/sfdx-project.json"), "{}").unwrap();
        fs::create_dir_all(base.path().join("notes")).unwrap();
        fs::write(base.path().join("readme.txt"), "x").unwrap();

        let projects = list_projects(base.path());
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(projects[0].has_sfdx_config && !projects[0].has_force_app);
        assert!(!projects[1].has_sfdx_config && projects[1].has_force_app);
    }

    #[test]
    fn missing_base_is_empty() {
        let base = TempDir::new().unwrap();
        assert!(list_projects(&base.path().join("nope")).is_empty());
    }
}
