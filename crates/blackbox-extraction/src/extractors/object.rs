//! Custom object (`*.object-meta.xml`) and field (`*.field-meta.xml`)
//! extractors.

use std::collections::BTreeSet;
use std::path::Path;

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::ExtractError;
use blackbox_core::types::{ExtractedPattern, PatternType};
use serde_json::{json, Value};

use super::common::{self, PatternSeed};
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};

const OBJECT_SUFFIX: &str = ".object-meta.xml";
const FIELD_SUFFIX: &str = ".field-meta.xml";

/// Object-level switches copied into the structure as-is.
const OBJECT_SETTINGS: [&str; 6] = [
    "sharingModel",
    "deploymentStatus",
    "enableActivities",
    "enableHistory",
    "enableReports",
    "enableSearch",
];

pub struct ObjectExtractor;

impl PatternExtractor for ObjectExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Object
    }

    fn name(&self) -> &'static str {
        "object"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        let Some(root) = common::read_root(file, "CustomObject")? else {
            return Ok(Vec::new());
        };
        let object_name = common::metadata_stem(file, OBJECT_SUFFIX);

        // Non-default overrides only, as `action:type`.
        let overrides: BTreeSet<String> = root
            .children("actionOverrides")
            .filter_map(|ov| {
                let action = ov.child_text_opt("actionName")?;
                let kind = ov.child_text("type");
                (kind != "Default").then(|| format!("{action}:{kind}"))
            })
            .collect();

        let mut structure = json!({
            "objectName": object_name,
            "nameFieldType": root.descendant("nameField").map_or("", |nf| nf.child_text("type")),
            "actionOverrides": overrides.iter().collect::<Vec<_>>(),
        });
        if let Some(map) = structure.as_object_mut() {
            for setting in OBJECT_SETTINGS {
                map.insert(setting.to_string(), json!(root.child_text(setting)));
            }
        }

        let anonymizer = ctx.anonymizer();
        let pattern = PatternSeed {
            pattern_type: PatternType::ObjectDefinition,
            name: format!("Object: {object_name}"),
            description: format!("Custom object definition for {object_name}."),
            source_object: object_name.clone(),
            structure: anonymizer.anonymize_structure(&structure, ""),
            field_references: vec![anonymizer.anonymize_field_name(&object_name)],
            api_version: String::new(),
            factors: ComplexityFactors::new().with(Factor::Elements, overrides.len() + 1),
        }
        .finish(file, ctx);
        Ok(vec![pattern])
    }
}

pub struct FieldExtractor;

impl PatternExtractor for FieldExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Field
    }

    fn name(&self) -> &'static str {
        "field"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        let Some(root) = common::read_root(file, "CustomField")? else {
            return Ok(Vec::new());
        };

        let full_name = root
            .child_text_opt("fullName")
            .map(str::to_string)
            .unwrap_or_else(|| common::metadata_stem(file, FIELD_SUFFIX));
        let field_type = root.child_text_opt("type").unwrap_or("Unknown");
        let formula = root.child_text_opt("formula");
        let reference_to = root.child_text_opt("referenceTo");
        let source_object = common::object_from_path(ctx.relative_path(file));
        let on_object = source_object != UNKNOWN_OBJECT;

        let mut map = serde_json::Map::new();
        map.insert("fieldName".into(), json!(full_name));
        map.insert("type".into(), json!(field_type));
        map.insert("required".into(), json!(root.child_bool("required")));
        map.insert("unique".into(), json!(root.child_bool("unique")));
        map.insert("externalId".into(), json!(root.child_bool("externalId")));
        for optional in ["length", "precision", "scale"] {
            if let Some(value) = root.child_text_opt(optional) {
                map.insert(optional.into(), json!(value));
            }
        }
        if root.child_text_opt("defaultValue").is_some() {
            map.insert("hasDefaultValue".into(), json!(true));
        }
        if formula.is_some() {
            map.insert("isFormula".into(), json!(true));
            map.insert("formulaReturnType".into(), json!(root.child_text("formulaTreatBlanksAs")));
        }
        if let Some(target) = reference_to {
            map.insert("referenceTo".into(), json!(target));
            map.insert("relationshipName".into(), json!(root.child_text("relationshipName")));
            map.insert("deleteConstraint".into(), json!(root.child_text("deleteConstraint")));
        }
        if let Some(value_set) = root.descendant("valueSet") {
            map.insert("hasPicklist".into(), json!(true));
            map.insert("picklistRestricted".into(), json!(value_set.child_bool("restricted")));
        }

        let anonymizer = ctx.anonymizer();
        let mut field_refs = vec![if on_object {
            format!("{source_object}.{full_name}")
        } else {
            full_name.clone()
        }];
        field_refs.extend(reference_to.map(str::to_string));
        let field_refs = field_refs
            .iter()
            .map(|r| anonymizer.anonymize_field_name(r))
            .collect();

        let mut description = format!("{field_type} field");
        if on_object {
            description.push_str(&format!(" on {source_object}"));
        }
        if let Some(target) = reference_to {
            description.push_str(&format!(" (lookup to {target})"));
        }
        description.push('.');

        let mut pattern = PatternSeed {
            pattern_type: PatternType::FieldDefinition,
            name: if on_object {
                format!("Field: {source_object}.{full_name}")
            } else {
                format!("Field: {full_name}")
            },
            description,
            source_object,
            structure: anonymizer.anonymize_structure(&Value::Object(map), ""),
            field_references: field_refs,
            api_version: String::new(),
            factors: ComplexityFactors::new()
                .with(Factor::Fields, 1)
                .with(Factor::Formulas, usize::from(formula.is_some())),
        }
        .finish(file, ctx);

        pattern.tags.push(format!("type:{}", field_type.to_lowercase()));
        if formula.is_some() {
            pattern.tags.push("formula-field".to_string());
        }
        if reference_to.is_some() {
            pattern.tags.push("lookup".to_string());
        }
        Ok(vec![pattern])
    }
}
