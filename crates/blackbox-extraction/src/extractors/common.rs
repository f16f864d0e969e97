//! Helpers shared by the extractors.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::ParseError;
use blackbox_core::types::{ExtractedPattern, PatternType};
use serde_json::Value;

use super::ExtractionContext;
use crate::complexity::{ComplexityFactors, ComplexityScorer};
use crate::xml::XmlElement;

/// Everything an extractor decides about a pattern. Category, score, tags,
/// source hash and file name are filled in by [`PatternSeed::finish`].
#[derive(Debug, Clone)]
pub struct PatternSeed {
    pub pattern_type: PatternType,
    pub name: String,
    pub description: String,
    pub source_object: String,
    pub structure: Value,
    pub field_references: Vec<String>,
    pub api_version: String,
    pub factors: ComplexityFactors,
}

impl PatternSeed {
    pub fn finish(self, file: &Path, ctx: &ExtractionContext<'_>) -> ExtractedPattern {
        let complexity_score = ComplexityScorer::score(&self.factors);
        tracing::trace!(
            pattern = %self.name,
            factors = %self.factors,
            score = complexity_score,
            "scored pattern"
        );
        let mut pattern = ExtractedPattern {
            pattern_type: self.pattern_type,
            category: self.pattern_type.category(),
            name: self.name,
            description: self.description,
            source_object: self.source_object,
            structure: self.structure,
            field_references: self.field_references,
            api_version: self.api_version,
            complexity_score,
            tags: Vec::new(),
            source_hash: ctx.source_hash().to_string(),
            source_file: file_name(file),
        };
        pattern.tags = auto_tags(&pattern);
        pattern
    }
}

/// Type, category slug, lowercase source object, API version and a
/// simple/complex marker.
pub fn auto_tags(pattern: &ExtractedPattern) -> Vec<String> {
    let mut tags = vec![
        pattern.pattern_type.as_str().to_string(),
        pattern.category.slug(),
    ];
    if !pattern.source_object.is_empty() && pattern.source_object != UNKNOWN_OBJECT {
        tags.push(pattern.source_object.to_lowercase());
    }
    if !pattern.api_version.is_empty() {
        tags.push(format!("api-v{}", pattern.api_version));
    }
    if pattern.complexity_score >= 4 {
        tags.push("complex".to_string());
    }
    if pattern.complexity_score <= 1 {
        tags.push("simple".to_string());
    }
    tags
}

/// Field references found anywhere in a structure, sorted.
///
/// A string containing `__c` or `__r` contributes each dot-separated part
/// that does. A two-part dotted string whose second part starts with a
/// capital (`Account.Name`) contributes itself, unless it is a `$` global.
pub fn walk_field_refs(structure: &Value) -> Vec<String> {
    let mut fields = BTreeSet::new();
    collect_field_refs(structure, &mut fields);
    fields.into_iter().collect()
}

fn collect_field_refs(node: &Value, fields: &mut BTreeSet<String>) {
    match node {
        Value::String(s) => {
            if s.contains("__c") || s.contains("__r") {
                for part in s.split('.') {
                    if part.contains("__c") || part.contains("__r") {
                        fields.insert(part.to_string());
                    }
                }
            }
            if s.contains('.') && !s.starts_with('$') {
                let parts: Vec<&str> = s.split('.').collect();
                if parts.len() == 2 && parts[1].chars().next().is_some_and(char::is_uppercase) {
                    fields.insert(s.clone());
                }
            }
        }
        Value::Object(map) => map.values().for_each(|v| collect_field_refs(v, fields)),
        Value::Array(items) => items.iter().for_each(|v| collect_field_refs(v, fields)),
        _ => {}
    }
}

/// The directory after `objects` in `path` (`objects/Account/fields/...`).
pub fn object_from_path(path: &Path) -> String {
    let mut components = path.components().filter_map(|c| match c {
        Component::Normal(s) => s.to_str(),
        _ => None,
    });
    while let Some(component) = components.next() {
        if component == "objects" {
            if let Some(object) = components.next() {
                return object.to_string();
            }
        }
    }
    UNKNOWN_OBJECT.to_string()
}

/// First `object`, `objectType` or `Object` descendant with text, then the
/// `object` of the first record lookup, update or create.
pub fn detect_source_object(root: &XmlElement) -> String {
    for tag in ["object", "objectType", "Object"] {
        if let Some(el) = root.descendant(tag).filter(|el| !el.text.is_empty()) {
            return el.text.clone();
        }
    }
    for parent in ["recordLookups", "recordUpdates", "recordCreates"] {
        if let Some(object) = root.children(parent).find_map(|el| el.child_text_opt("object")) {
            return object.to_string();
        }
    }
    UNKNOWN_OBJECT.to_string()
}

/// Underscores to spaces, trimmed.
pub fn humanize(name: &str) -> String {
    name.replace('_', " ").trim().to_string()
}

/// File name without a metadata suffix such as `.flow-meta.xml`.
pub fn metadata_stem(file: &Path, suffix: &str) -> String {
    let name = file_name(file);
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(name),
    }
}

pub fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse the file as XML and return the root when its name is `expected`.
pub fn read_root(file: &Path, expected: &str) -> Result<Option<XmlElement>, ParseError> {
    let root = XmlElement::parse_file(file)?;
    if root.name == expected {
        Ok(Some(root))
    } else {
        tracing::debug!(file = %file.display(), root = %root.name, expected, "unexpected root element");
        Ok(None)
    }
}
