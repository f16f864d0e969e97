//! Report extractor (`*.report-meta.xml`).

use std::collections::BTreeSet;
use std::path::Path;

use blackbox_core::errors::ExtractError;
use blackbox_core::types::{ExtractedPattern, PatternType};
use serde::Serialize;

use super::common::{self, PatternSeed};
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};
use crate::xml::XmlElement;

const SUFFIX: &str = ".report-meta.xml";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportStructure {
    report_type: String,
    format: String,
    column_count: usize,
    columns: Vec<Column>,
    filter_count: usize,
    filters: Vec<Filter>,
    groupings: Vec<Grouping>,
    custom_formulas: Vec<CustomFormula>,
    chart: Option<Chart>,
}

#[derive(Debug, Serialize)]
struct Column {
    field: String,
    aggregate: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Filter {
    Criteria {
        column: String,
        operator: String,
        snapshot: String,
    },
    Logic {
        #[serde(rename = "booleanFilter")]
        boolean_filter: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Grouping {
    field: String,
    date_granularity: String,
    sort_order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomFormula {
    label: String,
    formula_type: String,
    formula: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Chart {
    chart_type: String,
    enable_hover_labels: String,
    legend_position: String,
}

pub struct ReportExtractor;

impl PatternExtractor for ReportExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Report
    }

    fn name(&self) -> &'static str {
        "report"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        let Some(root) = common::read_root(file, "Report")? else {
            return Ok(Vec::new());
        };

        let name = root
            .child_text_opt("name")
            .map(str::to_string)
            .unwrap_or_else(|| common::metadata_stem(file, SUFFIX));
        let report_type = root.child_text_opt("reportType").unwrap_or("Unknown").to_string();
        let format = root.child_text_opt("format").unwrap_or("Tabular").to_string();
        let api_version = root.child_text("apiVersion").to_string();

        let columns: Vec<Column> = root
            .children("columns")
            .filter_map(|col| {
                col.child_text_opt("field").map(|field| Column {
                    field: field.to_string(),
                    aggregate: col.child_text("aggregateTypes").to_string(),
                })
            })
            .collect();
        let filters: Vec<Filter> = root.children("filter").flat_map(filters_of).collect();
        let groupings: Vec<Grouping> = root
            .children("groupingsDown")
            .map(|g| grouping(g, None))
            .chain(root.children("groupingsAcross").map(|g| grouping(g, Some("across"))))
            .collect();
        let custom_formulas: Vec<CustomFormula> = root
            .children("customDetailFormulas")
            .chain(root.children("customSummaryFormulas"))
            .map(|f| CustomFormula {
                label: f.child_text("label").to_string(),
                formula_type: f.child_text("formulaType").to_string(),
                formula: f.child_text("formula").to_string(),
            })
            .collect();
        let chart = root.descendant("chart").map(|c| Chart {
            chart_type: c.child_text("chartType").to_string(),
            enable_hover_labels: c.child_text("enableHoverLabels").to_string(),
            legend_position: c.child_text("legendPosition").to_string(),
        });

        let anonymizer = ctx.anonymizer();
        let field_refs: BTreeSet<String> = columns
            .iter()
            .map(|c| c.field.as_str())
            .chain(groupings.iter().map(|g| g.field.as_str()))
            .chain(filters.iter().filter_map(|f| match f {
                Filter::Criteria { column, .. } => Some(column.as_str()),
                Filter::Logic { .. } => None,
            }))
            .filter(|f| !f.is_empty())
            .map(|f| anonymizer.anonymize_field_name(f))
            .collect();

        let factors = ComplexityFactors::new()
            .with(Factor::Fields, columns.len())
            .with(Factor::Conditions, filters.len())
            .with(Factor::Formulas, custom_formulas.len())
            .with(Factor::Elements, groupings.len() + usize::from(chart.is_some()));

        let mut description = format!("{format} report on {report_type}, with {} columns", columns.len());
        if !groupings.is_empty() {
            description.push_str(&format!(", {} groupings", groupings.len()));
        }
        if !custom_formulas.is_empty() {
            description.push_str(&format!(", {} custom formulas", custom_formulas.len()));
        }
        description.push('.');

        let has_chart = chart.is_some();
        let has_formulas = !custom_formulas.is_empty();
        let structure = ReportStructure {
            report_type: report_type.clone(),
            format: format.clone(),
            column_count: columns.len(),
            columns,
            filter_count: filters.len(),
            filters,
            groupings,
            custom_formulas,
            chart,
        };
        let structure = serde_json::to_value(&structure).map_err(|e| ExtractError::Fault {
            extractor: self.name(),
            message: e.to_string(),
        })?;

        let mut pattern = PatternSeed {
            pattern_type: PatternType::ReportDefinition,
            name: format!("Report: {}", name.replace('_', " ")),
            description,
            source_object: report_type,
            structure: anonymizer.anonymize_structure(&structure, ""),
            field_references: field_refs.into_iter().collect(),
            api_version,
            factors,
        }
        .finish(file, ctx);

        pattern.tags.push(format!("format:{}", format.to_lowercase()));
        if has_chart {
            pattern.tags.push("has-chart".to_string());
        }
        if has_formulas {
            pattern.tags.push("custom-formulas".to_string());
        }
        Ok(vec![pattern])
    }
}

fn filters_of(filter: &XmlElement) -> Vec<Filter> {
    let mut out: Vec<Filter> = filter
        .children("criteriaItems")
        .map(|ci| Filter::Criteria {
            column: ci.child_text("column").to_string(),
            operator: ci.child_text("operator").to_string(),
            snapshot: ci.child_text("snapshot").to_string(),
        })
        .collect();
    if let Some(logic) = filter.child_text_opt("booleanFilter") {
        out.push(Filter::Logic {
            boolean_filter: logic.to_string(),
        });
    }
    out
}

fn grouping(g: &XmlElement, direction: Option<&'static str>) -> Grouping {
    Grouping {
        field: g.child_text("field").to_string(),
        date_granularity: g.child_text("dateGranularity").to_string(),
        sort_order: g.child_text("sortOrder").to_string(),
        direction,
    }
}
