//! Apex class extractor (`classes/**/*.cls`).
//!
//! Lexical heuristics over the source text: annotations, the class
//! declaration, method signatures, inline SOQL and DML verbs. No parsing of
//! method bodies.

use std::path::Path;
use std::sync::LazyLock;

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::{ExtractError, ParseError};
use blackbox_core::types::{ExtractedPattern, PatternType};
use regex::Regex;
use serde::Serialize;

use super::common::{self, PatternSeed};
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};

macro_rules! apex_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

apex_pattern!(RE_ANNOTATION, r"@(\w+)(?:\([^)]*\))?");
apex_pattern!(
    RE_CLASS_DECL,
    r"(public|private|global)\s+(?:(?:virtual|abstract|with sharing|without sharing|inherited sharing)\s+)*class\s+\w+\s*(?:extends\s+(\w+))?\s*(?:implements\s+([\w\s,.<>]+?))?\s*\{"
);
apex_pattern!(
    RE_METHOD,
    r"(public|private|global|protected)\s+(?:static\s+)?(\w+(?:<[\w,\s]+>)?)\s+(\w+)\s*\(([^)]*)\)"
);
apex_pattern!(RE_SOQL, r"(?i)\[SELECT\s+.+?\s+FROM\s+(\w+)");

const DML_VERBS: [&str; 6] = ["insert", "update", "upsert", "delete", "undelete", "merge"];

/// One matcher per verb, so `update insert rows` counts both statements.
static DML_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DML_VERBS
        .iter()
        .filter_map(|verb| Regex::new(&format!(r"(?i)\b{verb}\s+\w+")).ok().map(|re| (*verb, re)))
        .collect()
});

/// Structural summary of one class.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApexAnalysis {
    pub class_name: String,
    pub class_type: &'static str,
    pub access_modifier: String,
    pub annotations: Vec<String>,
    pub interfaces: Vec<String>,
    pub extends: String,
    pub methods: Vec<MethodSignature>,
    pub soql_patterns: Vec<SoqlPattern>,
    pub dml_operations: Vec<&'static str>,
    pub objects_referenced: Vec<String>,
    pub is_test: bool,
    pub is_batch: bool,
    pub is_schedulable: bool,
    pub is_trigger_handler: bool,
    pub is_aura_enabled: bool,
    pub is_rest_resource: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodSignature {
    pub access: String,
    pub return_type: String,
    pub name: String,
    pub param_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoqlPattern {
    pub object: String,
}

/// Analyze Apex source text.
pub fn analyze_apex(content: &str, class_name: &str) -> ApexAnalysis {
    let mut analysis = ApexAnalysis {
        class_name: class_name.to_string(),
        class_type: "standard",
        access_modifier: "public".to_string(),
        ..ApexAnalysis::default()
    };

    if let Some(re) = RE_ANNOTATION.as_ref() {
        for caps in re.captures_iter(content) {
            let annotation = &caps[1];
            match annotation {
                "isTest" | "IsTest" => analysis.is_test = true,
                "AuraEnabled" => analysis.is_aura_enabled = true,
                "RestResource" => analysis.is_rest_resource = true,
                _ => {}
            }
            if !analysis.annotations.iter().any(|a| a == annotation) {
                analysis.annotations.push(annotation.to_string());
            }
        }
    }
    let lower = content.to_lowercase();
    if lower.contains("@istest") || lower.contains("testmethod") {
        analysis.is_test = true;
    }

    if let Some(caps) = RE_CLASS_DECL.as_ref().and_then(|re| re.captures(content)) {
        analysis.access_modifier = caps[1].to_string();
        if let Some(parent) = caps.get(2) {
            analysis.extends = parent.as_str().to_string();
        }
        if let Some(implements) = caps.get(3) {
            let implements = implements.as_str();
            analysis.interfaces = implements
                .split(',')
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .map(str::to_string)
                .collect();
            analysis.is_batch = implements.contains("Database.Batchable");
            analysis.is_schedulable = implements.contains("Schedulable");
        }
    }

    if let Some(re) = RE_METHOD.as_ref() {
        analysis.methods = re
            .captures_iter(content)
            .map(|caps| MethodSignature {
                access: caps[1].to_string(),
                return_type: caps[2].to_string(),
                name: caps[3].to_string(),
                param_count: caps[4].split(',').filter(|p| !p.trim().is_empty()).count(),
            })
            .collect();
    }

    if let Some(re) = RE_SOQL.as_ref() {
        for caps in re.captures_iter(content) {
            let object = caps[1].to_string();
            if !analysis.objects_referenced.contains(&object) {
                analysis.objects_referenced.push(object.clone());
            }
            analysis.soql_patterns.push(SoqlPattern { object });
        }
    }

    analysis.dml_operations = DML_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(content))
        .map(|(verb, _)| *verb)
        .collect();

    analysis.is_trigger_handler =
        content.contains("TriggerHandler") || class_name.to_lowercase().contains("trigger");
    analysis
}

pub struct ApexExtractor;

impl PatternExtractor for ApexExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Apex
    }

    fn name(&self) -> &'static str {
        "apex"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        if file.extension().and_then(|e| e.to_str()) != Some("cls") {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(file).map_err(|source| ParseError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let class_name = common::metadata_stem(file, ".cls");
        let analysis = analyze_apex(&content, &class_name);
        if analysis.is_test && analysis.methods.is_empty() {
            return Ok(Vec::new());
        }

        let structure = serde_json::to_value(&analysis).map_err(|e| ExtractError::Fault {
            extractor: self.name(),
            message: e.to_string(),
        })?;
        let anonymizer = ctx.anonymizer();
        let factors = ComplexityFactors::new()
            .with(Factor::Elements, analysis.methods.len())
            .with(Factor::Conditions, analysis.soql_patterns.len())
            .with(Factor::RecordOps, analysis.dml_operations.len());

        let mut pattern = PatternSeed {
            pattern_type: PatternType::ApexClass,
            name: format!("Apex: {class_name}"),
            description: describe(&analysis),
            source_object: analysis
                .objects_referenced
                .first()
                .cloned()
                .unwrap_or_else(|| UNKNOWN_OBJECT.to_string()),
            structure: anonymizer.anonymize_structure(&structure, ""),
            field_references: analysis
                .objects_referenced
                .iter()
                .map(|o| anonymizer.anonymize_field_name(o))
                .collect(),
            api_version: String::new(),
            factors,
        }
        .finish(file, ctx);

        pattern
            .tags
            .extend(analysis.annotations.iter().map(|a| format!("annotation:{}", a.to_lowercase())));
        if analysis.is_batch {
            pattern.tags.push("batch".to_string());
        }
        if analysis.is_schedulable {
            pattern.tags.push("schedulable".to_string());
        }
        if analysis.is_rest_resource {
            pattern.tags.push("rest-api".to_string());
        }
        Ok(vec![pattern])
    }
}

fn describe(analysis: &ApexAnalysis) -> String {
    let kind = if analysis.is_test {
        "Test class".to_string()
    } else if analysis.is_batch {
        "Batch Apex class".to_string()
    } else if analysis.is_schedulable {
        "Schedulable Apex class".to_string()
    } else if analysis.is_rest_resource {
        "REST API resource class".to_string()
    } else if analysis.is_trigger_handler {
        "Trigger handler class".to_string()
    } else {
        format!("{} Apex class", title_case(&analysis.access_modifier))
    };

    let mut parts = vec![kind];
    if !analysis.methods.is_empty() {
        parts.push(format!("with {} methods", analysis.methods.len()));
    }
    if !analysis.objects_referenced.is_empty() {
        let shown: Vec<&str> = analysis.objects_referenced.iter().take(3).map(String::as_str).collect();
        parts.push(format!("operating on {}", shown.join(", ")));
    }
    format!("{}.", parts.join(" "))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
