//! Pattern record tests: content hashing and serialized shape.

use blackbox_core::types::{ExtractedPattern, PatternType};
use proptest::prelude::*;
use serde_json::json;

fn pattern(pattern_type: PatternType, name: &str, structure: serde_json::Value) -> ExtractedPattern {
    ExtractedPattern {
        pattern_type,
        category: pattern_type.category(),
        name: name.to_string(),
        description: String::new(),
        source_object: "Account".to_string(),
        structure,
        field_references: Vec::new(),
        api_version: "59.0".to_string(),
        complexity_score: 1,
        tags: Vec::new(),
        source_hash: "0123456789ab".to_string(),
        source_file: "Account.object-meta.xml".to_string(),
    }
}

#[test]
fn serialized_field_names() {
    let value = serde_json::to_value(pattern(PatternType::ValidationRule, "Rule", json!({}))).unwrap();
    assert_eq!(value["pattern_type"], "validation_rule");
    assert_eq!(value["category"], "Data Validation");
    for key in ["field_references", "complexity_score", "source_hash", "source_file", "api_version"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn structure_changes_the_hash() {
    let a = pattern(PatternType::FlowFull, "Flow", json!({"elements": 1}));
    let b = pattern(PatternType::FlowFull, "Flow", json!({"elements": 2}));
    assert_ne!(a.content_hash(), b.content_hash());
    assert_eq!(a.content_hash().len(), 16);
}

proptest! {
    #[test]
    fn hash_ignores_presentation_fields(name in "[A-Za-z ]{0,30}", score in 1u8..=5) {
        let base = pattern(PatternType::LayoutDefinition, "Layout", json!({"sectionCount": 2}));
        let mut renamed = base.clone();
        renamed.name = name;
        renamed.complexity_score = score;
        renamed.tags.push("renamed".to_string());
        prop_assert_eq!(base.content_hash(), renamed.content_hash());
    }

    #[test]
    fn type_participates_in_the_hash(i in 0usize..PatternType::ALL.len(), j in 0usize..PatternType::ALL.len()) {
        prop_assume!(i != j);
        let a = pattern(PatternType::ALL[i], "P", json!({}));
        let b = pattern(PatternType::ALL[j], "P", json!({}));
        prop_assert_ne!(a.content_hash(), b.content_hash());
    }
}
