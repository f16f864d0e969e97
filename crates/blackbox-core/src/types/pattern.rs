//! The extracted pattern record and its type/category taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Kind of structural unit a pattern describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    FlowFull,
    FlowDecision,
    FlowRecordLookup,
    FlowRecordUpdate,
    FlowRecordCreate,
    FlowRecordDelete,
    FlowScreen,
    FlowAssignment,
    FlowLoop,
    FlowActionCall,
    FlowSubflow,
    FlowFormula,
    FlowCollectionProcessor,
    ValidationRule,
    ObjectDefinition,
    FieldDefinition,
    LwcComponent,
    AuraComponent,
    ReportDefinition,
    ReportFormula,
    DashboardDefinition,
    LayoutDefinition,
    ApexClass,
    ApexTrigger,
}

impl PatternType {
    pub const ALL: [PatternType; 24] = [
        Self::FlowFull,
        Self::FlowDecision,
        Self::FlowRecordLookup,
        Self::FlowRecordUpdate,
        Self::FlowRecordCreate,
        Self::FlowRecordDelete,
        Self::FlowScreen,
        Self::FlowAssignment,
        Self::FlowLoop,
        Self::FlowActionCall,
        Self::FlowSubflow,
        Self::FlowFormula,
        Self::FlowCollectionProcessor,
        Self::ValidationRule,
        Self::ObjectDefinition,
        Self::FieldDefinition,
        Self::LwcComponent,
        Self::AuraComponent,
        Self::ReportDefinition,
        Self::ReportFormula,
        Self::DashboardDefinition,
        Self::LayoutDefinition,
        Self::ApexClass,
        Self::ApexTrigger,
    ];

    /// Stable string tag, also used as the first auto tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlowFull => "flow_full",
            Self::FlowDecision => "flow_decision",
            Self::FlowRecordLookup => "flow_record_lookup",
            Self::FlowRecordUpdate => "flow_record_update",
            Self::FlowRecordCreate => "flow_record_create",
            Self::FlowRecordDelete => "flow_record_delete",
            Self::FlowScreen => "flow_screen",
            Self::FlowAssignment => "flow_assignment",
            Self::FlowLoop => "flow_loop",
            Self::FlowActionCall => "flow_action_call",
            Self::FlowSubflow => "flow_subflow",
            Self::FlowFormula => "flow_formula",
            Self::FlowCollectionProcessor => "flow_collection_processor",
            Self::ValidationRule => "validation_rule",
            Self::ObjectDefinition => "object_definition",
            Self::FieldDefinition => "field_definition",
            Self::LwcComponent => "lwc_component",
            Self::AuraComponent => "aura_component",
            Self::ReportDefinition => "report_definition",
            Self::ReportFormula => "report_formula",
            Self::DashboardDefinition => "dashboard_definition",
            Self::LayoutDefinition => "layout_definition",
            Self::ApexClass => "apex_class",
            Self::ApexTrigger => "apex_trigger",
        }
    }

    /// Parse a string tag back into a pattern type.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// The display bucket this pattern type belongs to.
    pub fn category(&self) -> PatternCategory {
        match self {
            Self::FlowFull
            | Self::FlowDecision
            | Self::FlowRecordLookup
            | Self::FlowRecordUpdate
            | Self::FlowRecordCreate
            | Self::FlowRecordDelete
            | Self::FlowScreen
            | Self::FlowAssignment
            | Self::FlowLoop
            | Self::FlowActionCall
            | Self::FlowSubflow
            | Self::FlowFormula
            | Self::FlowCollectionProcessor => PatternCategory::FlowLogic,
            Self::ValidationRule => PatternCategory::DataValidation,
            Self::ObjectDefinition | Self::FieldDefinition => PatternCategory::DataModel,
            Self::LwcComponent | Self::AuraComponent => PatternCategory::UiComponent,
            Self::ReportDefinition | Self::ReportFormula | Self::DashboardDefinition => {
                PatternCategory::Reporting
            }
            Self::LayoutDefinition => PatternCategory::PageLayout,
            Self::ApexClass | Self::ApexTrigger => PatternCategory::ApexLogic,
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display buckets grouping pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternCategory {
    #[serde(rename = "Flow Logic")]
    FlowLogic,
    #[serde(rename = "Data Validation")]
    DataValidation,
    #[serde(rename = "Data Model")]
    DataModel,
    #[serde(rename = "UI Component")]
    UiComponent,
    #[serde(rename = "Reporting")]
    Reporting,
    #[serde(rename = "Page Layout")]
    PageLayout,
    #[serde(rename = "Apex Logic")]
    ApexLogic,
}

impl PatternCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FlowLogic => "Flow Logic",
            Self::DataValidation => "Data Validation",
            Self::DataModel => "Data Model",
            Self::UiComponent => "UI Component",
            Self::Reporting => "Reporting",
            Self::PageLayout => "Page Layout",
            Self::ApexLogic => "Apex Logic",
        }
    }

    /// Lowercase, dash-separated form used in tags (`flow-logic`).
    pub fn slug(&self) -> String {
        self.display_name().to_lowercase().replace(' ', "-")
    }

    /// Hex colour used when rendering the category.
    pub fn color(&self) -> &'static str {
        match self {
            Self::FlowLogic => "#3b82f6",
            Self::DataValidation => "#22c55e",
            Self::DataModel => "#a855f7",
            Self::UiComponent => "#f97316",
            Self::Reporting => "#eab308",
            Self::PageLayout => "#06b6d4",
            Self::ApexLogic => "#ef4444",
        }
    }
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single extracted, anonymized metadata pattern.
///
/// `structure` is an open JSON tree. It is the only payload the persistence
/// boundary relies on besides the scalar fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPattern {
    pub pattern_type: PatternType,
    pub category: PatternCategory,
    pub name: String,
    pub description: String,
    pub source_object: String,
    pub structure: serde_json::Value,
    pub field_references: Vec<String>,
    pub api_version: String,
    pub complexity_score: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_hash: String,
    /// File name as found on disk. Not scrubbed: a name such as
    /// `Acme_Tier_Sync.flow-meta.xml` is carried verbatim, so drop or
    /// rewrite this field before sharing patterns outside the org.
    #[serde(default)]
    pub source_file: String,
}

impl ExtractedPattern {
    /// Hex digest of `(pattern_type, source_object, structure)`.
    ///
    /// Two patterns with the same digest are the same unit of structure,
    /// whichever project they came from.
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::json!([
            self.pattern_type.as_str(),
            self.source_object,
            self.structure,
        ]);
        format!("{:016x}", xxh3_64(canonical.to_string().as_bytes()))
    }
}
