//! Flow extractor (`*.flow-meta.xml`).
//!
//! Emits one `flow_full` pattern describing the flow's interface, element
//! mix and connector topology, plus one pattern per element.

use std::collections::BTreeMap;
use std::path::Path;

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::ExtractError;
use blackbox_core::types::{ExtractedPattern, PatternType};
use serde_json::{json, Map, Value};

use super::common::{self, PatternSeed};
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};
use crate::xml::XmlElement;

const SUFFIX: &str = ".flow-meta.xml";

/// Element tags extracted as individual patterns, in output order.
const ELEMENT_TAGS: [(&str, PatternType); 12] = [
    ("decisions", PatternType::FlowDecision),
    ("recordLookups", PatternType::FlowRecordLookup),
    ("recordUpdates", PatternType::FlowRecordUpdate),
    ("recordCreates", PatternType::FlowRecordCreate),
    ("recordDeletes", PatternType::FlowRecordDelete),
    ("screens", PatternType::FlowScreen),
    ("assignments", PatternType::FlowAssignment),
    ("loops", PatternType::FlowLoop),
    ("actionCalls", PatternType::FlowActionCall),
    ("subflows", PatternType::FlowSubflow),
    ("formulas", PatternType::FlowFormula),
    ("collectionProcessors", PatternType::FlowCollectionProcessor),
];

const RECORD_OP_TAGS: [&str; 4] = ["recordLookups", "recordUpdates", "recordCreates", "recordDeletes"];

/// Connector child → edge type.
const CONNECTORS: [(&str, &str); 5] = [
    ("connector", "next"),
    ("faultConnector", "fault"),
    ("defaultConnector", "default"),
    ("nextValueConnector", "loop_next"),
    ("noMoreValuesConnector", "loop_done"),
];

pub struct FlowExtractor;

impl PatternExtractor for FlowExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Flow
    }

    fn name(&self) -> &'static str {
        "flow"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        let Some(root) = common::read_root(file, "Flow")? else {
            return Ok(Vec::new());
        };

        let api_version = text_or(&root, "apiVersion", "unknown");
        let process_type = text_or(&root, "processType", "unknown");
        let status = text_or(&root, "status", "unknown");
        let label = root
            .child_text_opt("label")
            .map(str::to_string)
            .unwrap_or_else(|| common::metadata_stem(file, SUFFIX));
        // Newer API versions declare the trigger under `<start>`.
        let trigger_type = root
            .child_text_opt("recordTriggerType")
            .or_else(|| root.child("start").and_then(|s| s.child_text_opt("recordTriggerType")))
            .unwrap_or_default()
            .to_string();
        let run_mode = root.child_text("runInMode").to_string();
        let source_object = detect_flow_object(&root);

        // Present tags only, sorted by tag name.
        let element_counts: BTreeMap<&str, usize> = ELEMENT_TAGS
            .iter()
            .map(|(tag, _)| (*tag, root.children(tag).count()))
            .filter(|(_, count)| *count > 0)
            .collect();

        let mut patterns = Vec::with_capacity(1 + element_counts.values().sum::<usize>());
        patterns.push(full_flow_pattern(
            file,
            ctx,
            &root,
            FlowHeader {
                api_version: &api_version,
                process_type: &process_type,
                status: &status,
                label: &label,
                trigger_type: &trigger_type,
                run_mode: &run_mode,
                source_object: &source_object,
            },
            &element_counts,
        ));

        for (tag, pattern_type) in ELEMENT_TAGS {
            for element in root.children(tag) {
                patterns.push(element_pattern(
                    file,
                    ctx,
                    element,
                    tag,
                    pattern_type,
                    &api_version,
                    &source_object,
                ));
            }
        }

        tracing::debug!(file = %file.display(), patterns = patterns.len(), "flow extracted");
        Ok(patterns)
    }
}

struct FlowHeader<'a> {
    api_version: &'a str,
    process_type: &'a str,
    status: &'a str,
    label: &'a str,
    trigger_type: &'a str,
    run_mode: &'a str,
    source_object: &'a str,
}

fn full_flow_pattern(
    file: &Path,
    ctx: &ExtractionContext<'_>,
    root: &XmlElement,
    header: FlowHeader<'_>,
    element_counts: &BTreeMap<&str, usize>,
) -> ExtractedPattern {
    let variables: Vec<Value> = root.children("variables").map(variable_signature).collect();
    let elements: Map<String, Value> = element_counts
        .iter()
        .map(|(tag, count)| (tag.to_string(), json!(count)))
        .collect();

    let structure = json!({
        "processType": header.process_type,
        "status": header.status,
        "triggerType": header.trigger_type,
        "runInMode": header.run_mode,
        "elements": elements,
        "variables": variables,
        "topology": build_topology(root),
    });
    let structure = ctx.anonymizer().anonymize_structure(&structure, "");

    let count = |tag: &str| element_counts.get(tag).copied().unwrap_or(0);
    let factors = ComplexityFactors::new()
        .with(Factor::Decisions, count("decisions"))
        .with(Factor::Loops, count("loops"))
        .with(Factor::RecordOps, RECORD_OP_TAGS.iter().map(|t| count(*t)).sum())
        .with(Factor::Screens, count("screens"))
        .with(Factor::Formulas, count("formulas"))
        .with(Factor::Subflows, count("subflows"))
        .with(Factor::Elements, element_counts.values().sum());

    let mut pattern = PatternSeed {
        pattern_type: PatternType::FlowFull,
        name: format!("Flow: {}", common::humanize(header.label)),
        description: describe_flow(header.process_type, header.trigger_type, element_counts, header.source_object),
        source_object: header.source_object.to_string(),
        field_references: common::walk_field_refs(&structure),
        structure,
        api_version: header.api_version.to_string(),
        factors,
    }
    .finish(file, ctx);

    pattern.tags.push(header.process_type.to_lowercase());
    if !header.trigger_type.is_empty() {
        pattern.tags.push(header.trigger_type.to_lowercase());
    }
    pattern
}

fn variable_signature(var: &XmlElement) -> Value {
    let mut signature = json!({
        "name": var.child_text("name"),
        "dataType": var.child_text("dataType"),
        "isInput": var.child_text("isInput") == "true",
        "isOutput": var.child_text("isOutput") == "true",
        "isCollection": var.child_text("isCollection") == "true",
    });
    if let (Some(apex_class), Some(map)) = (var.child_text_opt("apexClass"), signature.as_object_mut()) {
        map.insert("apexClass".to_string(), json!(apex_class));
    }
    signature
}

/// Edges `{from, to, type}` between named elements.
fn build_topology(root: &XmlElement) -> Vec<Value> {
    let mut edges = Vec::new();
    for (tag, _) in ELEMENT_TAGS {
        for element in root.children(tag) {
            let Some(name) = element.child_text_opt("name") else {
                continue;
            };
            let mut push = |target: Option<&str>, kind: String| {
                if let Some(to) = target {
                    edges.push(json!({"from": name, "to": to, "type": kind}));
                }
            };

            for (connector, kind) in &CONNECTORS[..2] {
                push(connector_target(element, connector), kind.to_string());
            }
            for rule in element.children("rules") {
                let rule_name = rule.child("name").map_or("unnamed", |n| n.text.as_str());
                push(connector_target(rule, "connector"), format!("rule:{rule_name}"));
            }
            for (connector, kind) in &CONNECTORS[2..] {
                push(connector_target(element, connector), kind.to_string());
            }
        }
    }
    edges
}

fn connector_target<'a>(element: &'a XmlElement, connector: &str) -> Option<&'a str> {
    element.child(connector)?.child_text_opt("targetReference")
}

fn element_pattern(
    file: &Path,
    ctx: &ExtractionContext<'_>,
    element: &XmlElement,
    tag: &str,
    pattern_type: PatternType,
    api_version: &str,
    flow_object: &str,
) -> ExtractedPattern {
    let name = element.child_text_opt("name").unwrap_or("unnamed");
    let label = element.child_text_opt("label").unwrap_or(name);

    let mut structure = element.to_value();
    if let Some(map) = structure.as_object_mut() {
        map.remove("locationX");
        map.remove("locationY");
    }
    let structure = ctx.anonymizer().anonymize_structure(&structure, "");
    let object = element.child_text_opt("object").unwrap_or(flow_object);

    PatternSeed {
        pattern_type,
        name: format!("{}: {}", element_title(tag), common::humanize(label)),
        description: describe_element(tag, label, object),
        source_object: object.to_string(),
        field_references: common::walk_field_refs(&structure),
        structure,
        api_version: api_version.to_string(),
        factors: element_factors(element, tag),
    }
    .finish(file, ctx)
}

fn element_factors(element: &XmlElement, tag: &str) -> ComplexityFactors {
    let mut factors = ComplexityFactors::new().with(Factor::Elements, 1);
    match tag {
        "decisions" => {
            let conditions = element.children("rules").map(|r| r.children("conditions").count()).sum();
            factors.add(Factor::Decisions, 1);
            factors.add(Factor::Conditions, conditions);
        }
        "screens" => {
            factors.add(Factor::Screens, 1);
            factors.add(Factor::Fields, element.children("fields").count());
        }
        t if RECORD_OP_TAGS.contains(&t) => {
            factors.add(Factor::RecordOps, 1);
            factors.add(Factor::Conditions, element.children("filters").count());
            factors.add(Factor::Fields, element.children("inputAssignments").count());
        }
        "loops" => factors.add(Factor::Loops, 1),
        "actionCalls" => {
            let params = element.children("inputParameters").count() + element.children("outputParameters").count();
            factors.add(Factor::Fields, params);
        }
        _ => {}
    }
    factors
}

/// `start/object`, else the most targeted object of the record operations
/// (first seen wins a tie), else the generic lookup.
fn detect_flow_object(root: &XmlElement) -> String {
    if let Some(object) = root.descendant("start").and_then(|s| s.child_text_opt("object")) {
        return object.to_string();
    }

    let mut votes: Vec<(&str, usize)> = Vec::new();
    for tag in RECORD_OP_TAGS {
        for object in root.children(tag).filter_map(|el| el.child_text_opt("object")) {
            match votes.iter_mut().find(|(o, _)| *o == object) {
                Some((_, n)) => *n += 1,
                None => votes.push((object, 1)),
            }
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (object, n) in votes {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((object, n));
        }
    }
    match best {
        Some((object, _)) => object.to_string(),
        None => common::detect_source_object(root),
    }
}

fn describe_flow(
    process_type: &str,
    trigger_type: &str,
    element_counts: &BTreeMap<&str, usize>,
    source_object: &str,
) -> String {
    let mut parts = vec![if trigger_type.is_empty() {
        format!("{process_type} flow")
    } else {
        format!("{trigger_type}-triggered {process_type} flow")
    }];
    if source_object != UNKNOWN_OBJECT {
        parts.push(format!("on {source_object}"));
    }
    if !element_counts.is_empty() {
        let summary: Vec<String> = element_counts
            .iter()
            .map(|(tag, count)| format!("{count} {tag}"))
            .collect();
        parts.push(format!("with {}", summary.join(", ")));
    }
    format!("{}.", parts.join(". "))
}

fn describe_element(tag: &str, label: &str, object: &str) -> String {
    let readable = tag
        .replace("record", "Record ")
        .replace("Lookups", "Lookup")
        .replace("Updates", "Update")
        .replace("Creates", "Create")
        .replace("Deletes", "Delete")
        .replace("actionCalls", "Action Call");
    if !object.is_empty() && object != UNKNOWN_OBJECT {
        format!("{readable} on {object}: {label}")
    } else {
        format!("{readable}: {label}")
    }
}

/// Singular tag with only its first letter capitalised (`recordLookups` →
/// `Recordlookup`).
fn element_title(tag: &str) -> String {
    let singular = tag.trim_end_matches('s').to_lowercase();
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn text_or(root: &XmlElement, name: &str, default: &str) -> String {
    root.child_text_opt(name).unwrap_or(default).to_string()
}
