//! Validation rule extractor (`*.validationRule-meta.xml`).

use std::path::Path;

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::ExtractError;
use blackbox_core::types::{ExtractedPattern, PatternType};
use serde::Serialize;
use serde_json::json;

use super::common::{self, PatternSeed};
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};

const SUFFIX: &str = ".validationRule-meta.xml";

/// Formula functions recognised, in reporting order.
pub const FORMULA_FUNCTIONS: [&str; 34] = [
    "AND", "OR", "NOT", "IF", "CASE", "ISBLANK", "ISNULL", "ISPICKVAL", "ISCHANGED", "ISNEW",
    "PRIORVALUE", "TEXT", "VALUE", "LEN", "LEFT", "RIGHT", "MID", "CONTAINS", "BEGINS",
    "INCLUDES", "TODAY", "NOW", "DATEVALUE", "DATETIMEVALUE", "YEAR", "MONTH", "DAY", "REGEX",
    "SUBSTITUTE", "TRIM", "NULLVALUE", "BLANKVALUE", "HYPERLINK", "IMAGE",
];

/// Rules nested deeper than this are called out in the description.
const DEEP_NESTING: usize = 3;

/// Shape of an error-condition formula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormulaAnalysis {
    pub functions_used: Vec<&'static str>,
    pub condition_count: usize,
    pub nesting_depth: usize,
    pub uses_permissions: bool,
    pub uses_record_type: bool,
    pub uses_profile: bool,
}

/// Analyze a formula.
///
/// Function names match case-insensitively and only as whole identifiers,
/// so `TODAY(` does not count as `DAY(`. `condition_count` is one more than
/// the number of `AND(`/`OR(` calls. `nesting_depth` counts the call levels
/// below the outermost one.
pub fn analyze_formula(formula: &str) -> FormulaAnalysis {
    if formula.trim().is_empty() {
        return FormulaAnalysis::default();
    }
    let upper = formula.to_uppercase();

    let functions_used = FORMULA_FUNCTIONS
        .iter()
        .copied()
        .filter(|f| call_count(&upper, f) > 0)
        .collect();

    let mut depth: usize = 0;
    let mut max_depth: usize = 0;
    for c in formula.chars() {
        match c {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    FormulaAnalysis {
        functions_used,
        condition_count: call_count(&upper, "AND") + call_count(&upper, "OR") + 1,
        nesting_depth: max_depth.saturating_sub(1),
        uses_permissions: formula.contains("$Permission"),
        uses_record_type: formula.contains("RecordType"),
        uses_profile: formula.contains("$Profile") || formula.contains("$UserRole"),
    }
}

/// Occurrences of `name(` not preceded by an identifier character.
fn call_count(haystack: &str, name: &str) -> usize {
    let needle = format!("{name}(");
    let bytes = haystack.as_bytes();
    haystack
        .match_indices(&needle)
        .filter(|(i, _)| *i == 0 || !is_ident_byte(bytes[i - 1]))
        .count()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub struct ValidationRuleExtractor;

impl PatternExtractor for ValidationRuleExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::ValidationRule
    }

    fn name(&self) -> &'static str {
        "validation_rule"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        let Some(root) = common::read_root(file, "ValidationRule")? else {
            return Ok(Vec::new());
        };

        let full_name = root
            .child_text_opt("fullName")
            .map(str::to_string)
            .unwrap_or_else(|| common::metadata_stem(file, SUFFIX));
        let active = root.child_bool("active");
        let formula = root.child_text("errorConditionFormula");
        let error_field = root.child_text("errorDisplayField");
        let source_object = common::object_from_path(ctx.relative_path(file));

        let anonymizer = ctx.anonymizer();
        let field_refs = anonymizer.formula_field_refs(formula);
        let analysis = analyze_formula(formula);

        let structure = json!({
            "active": active,
            "formulaPattern": analysis,
            "rawFormula": formula,
            "errorDisplayField": error_field,
            "fieldCount": field_refs.len(),
        });

        let factors = ComplexityFactors::new()
            .with(Factor::Conditions, analysis.condition_count)
            .with(Factor::NestingDepth, analysis.nesting_depth)
            .with(Factor::Formulas, 1)
            .with(Factor::Fields, field_refs.len());

        let mut pattern = PatternSeed {
            pattern_type: PatternType::ValidationRule,
            name: format!("Validation: {}", common::humanize(&full_name)),
            description: describe(&analysis, &source_object, active),
            source_object,
            structure: anonymizer.anonymize_structure(&structure, ""),
            field_references: field_refs,
            api_version: String::new(),
            factors,
        }
        .finish(file, ctx);

        if active {
            pattern.tags.push("active".to_string());
        }
        pattern
            .tags
            .extend(analysis.functions_used.iter().map(|f| format!("func:{}", f.to_lowercase())));
        Ok(vec![pattern])
    }
}

fn describe(analysis: &FormulaAnalysis, object: &str, active: bool) -> String {
    let mut parts = vec![format!(
        "{} validation rule",
        if active { "Active" } else { "Inactive" }
    )];
    if object != UNKNOWN_OBJECT {
        parts.push(format!("on {object}"));
    }
    if !analysis.functions_used.is_empty() {
        let shown: Vec<&str> = analysis.functions_used.iter().take(5).copied().collect();
        parts.push(format!("using {}", shown.join(", ")));
    }
    if analysis.nesting_depth > DEEP_NESTING {
        parts.push(format!("(deeply nested: {} levels)", analysis.nesting_depth));
    }
    format!("{}.", parts.join(" "))
}
