//! Lightning web component extractor (`lwc/<name>/<name>.js`).
//!
//! Reads the component's JS module and, when present, its sibling HTML
//! template and `.js-meta.xml` descriptor from the bundle directory.

use std::path::{Component, Path};
use std::sync::LazyLock;

use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::errors::{ExtractError, ParseError};
use blackbox_core::types::{ExtractedPattern, PatternType};
use regex::Regex;
use serde::Serialize;
use serde_json::json;

use super::common::PatternSeed;
use super::{ExtractionContext, MetadataKind, PatternExtractor};
use crate::complexity::{ComplexityFactors, Factor};

macro_rules! lwc_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── JS ─────────────────────────────────────────────────────────────────────
lwc_pattern!(RE_API_PROP, r"@api\s+(\w+)");
lwc_pattern!(RE_TRACK_PROP, r"@track\s+(\w+)");
lwc_pattern!(RE_WIRE, r"@wire\((\w+)(?:,\s*\{[^}]*\})?\)");
lwc_pattern!(
    RE_APEX_IMPORT,
    r#"import\s+(\w+)\s+from\s+['"]@salesforce/apex/(\w+\.\w+)['"]"#
);
lwc_pattern!(
    RE_SCHEMA_IMPORT,
    r#"import\s+\w+\s+from\s+['"]@salesforce/schema/(\w+\.\w+)['"]"#
);
lwc_pattern!(RE_HANDLER, r"(handle\w+)\s*\(");

// ── HTML ───────────────────────────────────────────────────────────────────
lwc_pattern!(RE_CHILD_COMPONENT, r"<(c-[\w-]+|lightning-[\w-]+)");
lwc_pattern!(RE_CONDITIONAL, r"(?:if:true|if:false|lwc:if|lwc:elseif)=\{([^}]+)\}");
lwc_pattern!(RE_ITERATION, r"for:each=\{([^}]+)\}");

// ── Meta XML ───────────────────────────────────────────────────────────────
lwc_pattern!(RE_API_VERSION, r"<apiVersion>([\d.]+)</apiVersion>");
lwc_pattern!(RE_TARGET, r"<target>([\w:]+)</target>");
lwc_pattern!(RE_OBJECT_BINDING, r"<objects>\s*<object>(\w+)</object>");

const LIFECYCLE_HOOKS: [&str; 4] = [
    "connectedCallback",
    "disconnectedCallback",
    "renderedCallback",
    "errorCallback",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct JsAnalysis {
    pub api_properties: Vec<String>,
    pub tracked_properties: Vec<String>,
    pub wire_adapters: Vec<String>,
    pub apex_calls: Vec<ApexCall>,
    pub event_handlers: Vec<String>,
    pub navigation: bool,
    pub toast: bool,
    pub lifecycle_hooks: Vec<&'static str>,
    pub field_references: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApexCall {
    pub local_name: String,
    pub method: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HtmlAnalysis {
    pub child_components: Vec<String>,
    pub conditionals: Vec<String>,
    pub iterations: Vec<String>,
    pub slots: bool,
    pub forms: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaAnalysis {
    pub api_version: String,
    pub is_exposed: bool,
    pub targets: Vec<String>,
    pub primary_object: String,
}

impl Default for MetaAnalysis {
    fn default() -> Self {
        Self {
            api_version: String::new(),
            is_exposed: false,
            targets: Vec::new(),
            primary_object: UNKNOWN_OBJECT.to_string(),
        }
    }
}

fn captures(re: &LazyLock<Option<Regex>>, text: &str, group: usize) -> Vec<String> {
    re.as_ref().map_or_else(Vec::new, |re| {
        re.captures_iter(text)
            .filter_map(|c| c.get(group).map(|m| m.as_str().to_string()))
            .collect()
    })
}

pub fn analyze_js(content: &str) -> JsAnalysis {
    let apex_calls = RE_APEX_IMPORT.as_ref().map_or_else(Vec::new, |re| {
        re.captures_iter(content)
            .map(|c| ApexCall {
                local_name: c[1].to_string(),
                method: c[2].to_string(),
            })
            .collect()
    });
    JsAnalysis {
        api_properties: captures(&RE_API_PROP, content, 1),
        tracked_properties: captures(&RE_TRACK_PROP, content, 1),
        wire_adapters: captures(&RE_WIRE, content, 1),
        apex_calls,
        event_handlers: captures(&RE_HANDLER, content, 1),
        navigation: content.contains("NavigationMixin"),
        toast: content.contains("ShowToastEvent"),
        lifecycle_hooks: LIFECYCLE_HOOKS.iter().copied().filter(|h| content.contains(h)).collect(),
        field_references: captures(&RE_SCHEMA_IMPORT, content, 1),
    }
}

pub fn analyze_html(content: &str) -> HtmlAnalysis {
    let mut child_components: Vec<String> = Vec::new();
    for component in captures(&RE_CHILD_COMPONENT, content, 1) {
        if !child_components.contains(&component) {
            child_components.push(component);
        }
    }
    HtmlAnalysis {
        child_components,
        conditionals: captures(&RE_CONDITIONAL, content, 1),
        iterations: captures(&RE_ITERATION, content, 1),
        slots: content.contains("<slot"),
        forms: content.contains("lightning-input") || content.contains("lightning-combobox"),
    }
}

pub fn analyze_meta(content: &str) -> MetaAnalysis {
    let first = |re: &LazyLock<Option<Regex>>| captures(re, content, 1).into_iter().next();
    MetaAnalysis {
        api_version: first(&RE_API_VERSION).unwrap_or_default(),
        is_exposed: content.contains("<isExposed>true</isExposed>"),
        // `lightning__RecordPage` → `RecordPage`
        targets: captures(&RE_TARGET, content, 1)
            .into_iter()
            .map(|t| t.rsplit("__").next().unwrap_or_default().to_string())
            .collect(),
        primary_object: first(&RE_OBJECT_BINDING).unwrap_or_else(|| UNKNOWN_OBJECT.to_string()),
    }
}

pub struct LwcExtractor;

impl PatternExtractor for LwcExtractor {
    fn kind(&self) -> MetadataKind {
        MetadataKind::Lwc
    }

    fn name(&self) -> &'static str {
        "lwc"
    }

    fn extract(&self, file: &Path, ctx: &ExtractionContext<'_>) -> Result<Vec<ExtractedPattern>, ExtractError> {
        if file.extension().and_then(|e| e.to_str()) != Some("js") || is_test_file(file) {
            return Ok(Vec::new());
        }
        let js = read_lossy(file)?;
        if js.trim().is_empty() {
            return Ok(Vec::new());
        }
        let component = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bundle = file.parent().unwrap_or_else(|| Path::new("."));

        // Siblings are optional; unreadable ones are treated as absent.
        let html = std::fs::read_to_string(bundle.join(format!("{component}.html"))).ok();
        let meta = std::fs::read_to_string(bundle.join(format!("{component}.js-meta.xml"))).ok();

        let js = analyze_js(&js);
        let html = html.as_deref().map(analyze_html).unwrap_or_default();
        let meta = meta.as_deref().map(analyze_meta).unwrap_or_default();

        let structure = json!({
            "componentName": component,
            "js": js,
            "html": html,
            "meta": meta,
        });

        let factors = ComplexityFactors::new()
            .with(Factor::Fields, js.api_properties.len())
            .with(
                Factor::Elements,
                js.wire_adapters.len() + js.apex_calls.len() + html.child_components.len(),
            )
            .with(Factor::Conditions, html.conditionals.len())
            .with(Factor::Loops, html.iterations.len());

        let anonymizer = ctx.anonymizer();
        let mut pattern = PatternSeed {
            pattern_type: PatternType::LwcComponent,
            name: format!("LWC: {}", readable_component_name(&component)),
            description: describe(&js, &html, &meta),
            source_object: meta.primary_object.clone(),
            structure: anonymizer.anonymize_structure(&structure, ""),
            field_references: js
                .field_references
                .iter()
                .map(|f| anonymizer.anonymize_field_name(f))
                .collect(),
            api_version: meta.api_version.clone(),
            factors,
        }
        .finish(file, ctx);

        if !js.wire_adapters.is_empty() {
            pattern.tags.push("uses-wire".to_string());
        }
        if !js.apex_calls.is_empty() {
            pattern.tags.push("calls-apex".to_string());
        }
        if js.navigation {
            pattern.tags.push("uses-navigation".to_string());
        }
        pattern
            .tags
            .extend(meta.targets.iter().map(|t| format!("target:{t}")));
        Ok(vec![pattern])
    }
}

fn is_test_file(file: &Path) -> bool {
    file.components()
        .any(|c| matches!(c, Component::Normal(s) if s == "__tests__"))
}

fn read_lossy(file: &Path) -> Result<String, ParseError> {
    let bytes = std::fs::read(file).map_err(|source| ParseError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `accountTierBadge` → `Account Tier Badge`.
fn readable_component_name(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }
    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(js: &JsAnalysis, html: &HtmlAnalysis, meta: &MetaAnalysis) -> String {
    let mut parts = vec!["Lightning Web Component".to_string()];
    if !meta.targets.is_empty() {
        let shown: Vec<&str> = meta.targets.iter().take(3).map(String::as_str).collect();
        parts.push(format!("for {}", shown.join(", ")));
    }
    let mut features = Vec::new();
    if !js.wire_adapters.is_empty() {
        features.push(format!("{} wire adapters", js.wire_adapters.len()));
    }
    if !js.apex_calls.is_empty() {
        features.push(format!("{} Apex calls", js.apex_calls.len()));
    }
    if !js.api_properties.is_empty() {
        features.push(format!("{} @api props", js.api_properties.len()));
    }
    if !html.child_components.is_empty() {
        features.push(format!("{} child components", html.child_components.len()));
    }
    if !features.is_empty() {
        parts.push(format!("with {}", features.join(", ")));
    }
    format!("{}.", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JS: &str = r#"
import { LightningElement, api, wire } from 'lwc';
import { NavigationMixin } from 'lightning/navigation';
import getTiers from '@salesforce/apex/TierController.getTiers';
import TIER_FIELD from '@salesforce/schema/Account.Tier__c';

export default class AccountTierBadge extends NavigationMixin(LightningElement) {
    @api recordId;
    @wire(getTiers, { accountId: '$recordId' }) tiers;
    connectedCallback() {}
    handleClick(event) {}
}
"#;

    #[test]
    fn js_analysis() {
        let js = analyze_js(JS);
        assert_eq!(js.api_properties, vec!["recordId"]);
        assert_eq!(js.wire_adapters, vec!["getTiers"]);
        assert_eq!(js.apex_calls.len(), 1);
        assert_eq!(js.apex_calls[0].method, "TierController.getTiers");
        assert_eq!(js.field_references, vec!["Account.Tier__c"]);
        assert_eq!(js.event_handlers, vec!["handleClick"]);
        assert_eq!(js.lifecycle_hooks, vec!["connectedCallback"]);
        assert!(js.navigation);
        assert!(!js.toast);
    }

    #[test]
    fn html_and_meta_analysis() {
        let html = analyze_html(
            r#"<template><template lwc:if={hasTiers}><template for:each={tiers} for:item="t">
            <lightning-badge key={t.Id}></lightning-badge><c-tier-row></c-tier-row><lightning-badge></lightning-badge>
            </template></template><slot></slot></template>"#,
        );
        assert_eq!(html.child_components, vec!["lightning-badge", "c-tier-row"]);
        assert_eq!(html.conditionals, vec!["hasTiers"]);
        assert_eq!(html.iterations, vec!["tiers"]);
        assert!(html.slots);
        assert!(!html.forms);

        let meta = analyze_meta(
            "<LightningComponentBundle><apiVersion>59.0</apiVersion><isExposed>true</isExposed>\
             <targets><target>lightning__RecordPage</target></targets>\
             <targetConfigs><targetConfig targets=\"lightning__RecordPage\"><objects>\n<object>Account</object></objects></targetConfig></targetConfigs>\
             </LightningComponentBundle>",
        );
        assert_eq!(meta.api_version, "59.0");
        assert!(meta.is_exposed);
        assert_eq!(meta.targets, vec!["RecordPage"]);
        assert_eq!(meta.primary_object, "Account");
    }

    #[test]
    fn component_names() {
        assert_eq!(readable_component_name("accountTierBadge"), "Account Tier Badge");
        assert!(is_test_file(Path::new("lwc/x/__tests__/x.test.js")));
    }
}
