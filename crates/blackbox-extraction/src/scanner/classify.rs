//! File classification by name and path.

use std::path::Path;

use crate::extractors::MetadataKind;

/// Suffix rules, checked before the path-based rules.
const SUFFIX_KINDS: [(&str, MetadataKind); 6] = [
    (".flow-meta.xml", MetadataKind::Flow),
    (".validationRule-meta.xml", MetadataKind::ValidationRule),
    (".object-meta.xml", MetadataKind::Object),
    (".field-meta.xml", MetadataKind::Field),
    (".report-meta.xml", MetadataKind::Report),
    (".layout-meta.xml", MetadataKind::Layout),
];

/// Classify a file path, relative to the metadata root.
///
/// A `.js` file is a component entry point only when it sits under an `lwc`
/// directory and its stem equals its parent directory name
/// (`lwc/tierBadge/tierBadge.js`). A `.cls` file counts only under a
/// `classes` directory.
pub fn classify(path: &Path) -> Option<MetadataKind> {
    let name = path.file_name()?.to_str()?;
    if let Some((_, kind)) = SUFFIX_KINDS.iter().find(|(suffix, _)| name.ends_with(suffix)) {
        return Some(*kind);
    }

    match path.extension()?.to_str()? {
        "js" if has_component(path, "lwc") && is_component_entry(path) => Some(MetadataKind::Lwc),
        "cls" if has_component(path, "classes") => Some(MetadataKind::Apex),
        _ => None,
    }
}

fn has_component(path: &Path, name: &str) -> bool {
    path.components().any(|c| c.as_os_str() == name)
}

fn is_component_entry(path: &Path) -> bool {
    let parent = path.parent().and_then(Path::file_name);
    parent.is_some() && path.file_stem() == parent
}
