//! Page layout extractor (`*.layout-meta.xml`).
//!
//! Keeps the section/field skeleton of a layout. Coordinates, spacing and
//! other presentation-only settings are dropped.

use std::collections::BTreeSet;
use std::path::Path;

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::ExtractError;
use blackbox_core::types::{ExtractedPattern, PatternType};
use serde_json::{json, Value};

use super::common::{self, PatternSeed};
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};
use crate::xml::XmlElement;

const SUFFIX: &str = ".layout-meta.xml";

pub struct LayoutExtractor;

impl PatternExtractor for LayoutExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Layout
    }

    fn name(&self) -> &'static str {
        "layout"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        let Some(root) = common::read_root(file, "Layout")? else {
            return Ok(Vec::new());
        };

        // `Object-Layout Name`
        let stem = common::metadata_stem(file, SUFFIX);
        let (source_object, display_name) = match stem.split_once('-') {
            Some((object, display)) => (object.to_string(), display.to_string()),
            None => (UNKNOWN_OBJECT.to_string(), stem.clone()),
        };

        let mut all_fields: Vec<&str> = Vec::new();
        let sections: Vec<Value> = root
            .children("layoutSections")
            .map(|section| {
                let (value, fields) = section_summary(section);
                all_fields.extend(fields);
                value
            })
            .collect();

        let related_lists: Vec<Value> = root
            .children("relatedLists")
            .map(|rl| {
                let fields: Vec<&str> = rl
                    .children("fields")
                    .map(|f| f.text.as_str())
                    .filter(|t| !t.is_empty())
                    .collect();
                json!({"relatedList": rl.child_text("relatedList"), "fields": fields})
            })
            .collect();

        let quick_actions: Vec<&str> = root
            .children("quickActionList")
            .flat_map(|qa| qa.children("quickActionListItems"))
            .filter_map(|item| item.child_text_opt("quickActionName"))
            .collect();

        let structure = json!({
            "sectionCount": sections.len(),
            "sections": sections,
            "relatedLists": related_lists,
            "quickActions": quick_actions,
            "totalFields": all_fields.len(),
        });

        let anonymizer = ctx.anonymizer();
        let field_refs: BTreeSet<String> = all_fields
            .iter()
            .map(|f| anonymizer.anonymize_field_name(f))
            .collect();

        let mut pattern = PatternSeed {
            pattern_type: PatternType::LayoutDefinition,
            name: format!("Layout: {source_object} - {}", display_name.replace('_', " ")),
            description: format!(
                "Page layout for {source_object} with {} sections and {} fields.",
                sections.len(),
                all_fields.len()
            ),
            source_object,
            structure: anonymizer.anonymize_structure(&structure, ""),
            field_references: field_refs.into_iter().collect(),
            api_version: String::new(),
            factors: ComplexityFactors::new()
                .with(Factor::Fields, all_fields.len())
                .with(Factor::Elements, sections.len() + related_lists.len()),
        }
        .finish(file, ctx);

        if !related_lists.is_empty() {
            pattern.tags.push("has-related-lists".to_string());
        }
        if !quick_actions.is_empty() {
            pattern.tags.push("has-quick-actions".to_string());
        }
        Ok(vec![pattern])
    }
}

/// Section structure plus the fields it places.
fn section_summary(section: &XmlElement) -> (Value, Vec<&str>) {
    let columns: Vec<&XmlElement> = section.children("layoutColumns").collect();
    let items: Vec<(&str, &str)> = columns
        .iter()
        .flat_map(|col| col.children("layoutItems"))
        .filter_map(|item| item.child_text_opt("field").map(|f| (f, item.child_text("behavior"))))
        .collect();

    let value = json!({
        "label": section.child_text("label"),
        "style": section.child_text("style"),
        "columnCount": columns.len(),
        "fieldCount": items.len(),
        "fields": items
            .iter()
            .map(|(field, behavior)| json!({"field": field, "behavior": behavior}))
            .collect::<Vec<_>>(),
    });
    (value, items.into_iter().map(|(field, _)| field).collect())
}
