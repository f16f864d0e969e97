//! Extractor tests: one metadata file at a time through the registry.
//!
//! Tests cover: reports, layouts, objects and fields (lookup and formula),
//! unexpected root elements, and formats that legitimately yield nothing.

use std::fs;
use std::path::{Path, PathBuf};

use blackbox_core::errors::BlackboxErrorCode;
use blackbox_core::types::{ExtractedPattern, PatternCategory, PatternType};
use blackbox_extraction::anonymizer::BrandScrubber;
use blackbox_extraction::extractors::{extractor_for, ExtractionContext, MetadataKind, PatternExtractor};
use serde_json::json;
use tempfile::TempDir;

// ---- Helpers ----

const HASH: &str = "0123456789ab";

fn acme_scrubber() -> BrandScrubber {
    let mut scrubber = BrandScrubber::new();
    scrubber.add_terms(["Acme"]);
    scrubber
}

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn extract(kind: MetadataKind, root: &Path, file: &Path) -> Vec<ExtractedPattern> {
    let scrubber = acme_scrubber();
    let ctx = ExtractionContext::new(&scrubber, HASH, root);
    let extractor: &dyn PatternExtractor = extractor_for(kind);
    extractor.extract(file, &ctx).expect("extraction succeeds")
}

fn single(kind: MetadataKind, root: &Path, file: &Path) -> ExtractedPattern {
    let mut patterns = extract(kind, root, file);
    assert_eq!(patterns.len(), 1, "expected exactly one pattern");
    patterns.remove(0)
}

fn has_tag(pattern: &ExtractedPattern, tag: &str) -> bool {
    pattern.tags.iter().any(|t| t == tag)
}

// ---- Report ----

const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Report xmlns="http://soap.sforce.com/2006/04/metadata">
    <name>Pipeline_By_Stage</name>
    <reportType>Opportunity</reportType>
    <format>Summary</format>
    <columns>
        <field>AMOUNT</field>
        <aggregateTypes>Sum</aggregateTypes>
    </columns>
    <columns>
        <field>Opportunity.Acme_Tier__c</field>
    </columns>
    <filter>
        <criteriaItems>
            <column>STAGE_NAME</column>
            <operator>notEqual</operator>
            <value>Closed Lost</value>
        </criteriaItems>
        <booleanFilter>1</booleanFilter>
    </filter>
    <groupingsDown>
        <field>STAGE_NAME</field>
        <dateGranularity>Day</dateGranularity>
        <sortOrder>Asc</sortOrder>
    </groupingsDown>
    <chart>
        <chartType>HorizontalBar</chartType>
        <enableHoverLabels>true</enableHoverLabels>
        <legendPosition>Right</legendPosition>
    </chart>
</Report>
"#;

#[test]
fn report_structure_and_references() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "reports/Sales/Pipeline_By_Stage.report-meta.xml", REPORT);
    let report = single(MetadataKind::Report, tmp.path(), &file);

    assert_eq!(report.pattern_type, PatternType::ReportDefinition);
    assert_eq!(report.category, PatternCategory::Reporting);
    assert_eq!(report.name, "Report: Pipeline By Stage");
    assert_eq!(report.source_object, "Opportunity");
    assert_eq!(
        report.description,
        "Summary report on Opportunity, with 2 columns, 1 groupings."
    );
    assert_eq!(
        report.field_references,
        vec!["AMOUNT", "Opportunity.Brand_A_Tier__c", "STAGE_NAME"]
    );

    let s = &report.structure;
    assert_eq!(s["columnCount"], 2);
    assert_eq!(s["columns"][0], json!({"field": "AMOUNT", "aggregate": "Sum"}));
    assert_eq!(s["columns"][1]["field"], "Opportunity.Brand_A_Tier__c");
    assert_eq!(s["filterCount"], 2);
    assert_eq!(s["filters"][0]["operator"], "notEqual");
    assert_eq!(s["filters"][1], json!({"booleanFilter": "1"}));
    assert!(s["groupings"][0].get("direction").is_none());
    assert_eq!(s["chart"]["chartType"], "HorizontalBar");

    // 2 fields × 0.5 + 2 conditions + 2 elements × 0.3 = 3.6
    assert_eq!(report.complexity_score, 2);
    assert!(has_tag(&report, "format:summary"));
    assert!(has_tag(&report, "has-chart"));
    assert!(!has_tag(&report, "custom-formulas"));
    assert_eq!(report.source_file, "Pipeline_By_Stage.report-meta.xml");
    assert_eq!(report.source_hash, HASH);
}

#[test]
fn report_without_chart_serializes_null() {
    let tmp = TempDir::new().unwrap();
    let file = write(
        tmp.path(),
        "reports/Plain.report-meta.xml",
        "<Report><reportType>Case</reportType>\
         <groupingsAcross><field>OWNER</field></groupingsAcross>\
         <customDetailFormulas><label>Age</label><formulaType>number</formulaType>\
         <formula>TODAY() - CREATED_DATE</formula></customDetailFormulas></Report>",
    );
    let report = single(MetadataKind::Report, tmp.path(), &file);

    assert_eq!(report.name, "Report: Plain");
    assert!(report.structure["chart"].is_null());
    assert_eq!(report.structure["format"], "Tabular");
    assert_eq!(report.structure["groupings"][0]["direction"], "across");
    assert_eq!(report.structure["customFormulas"][0]["formulaType"], "number");
    assert!(has_tag(&report, "custom-formulas"));
}

// ---- Layout ----

const LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Layout xmlns="http://soap.sforce.com/2006/04/metadata">
    <layoutSections>
        <label>Information</label>
        <style>TwoColumnsTopToBottom</style>
        <layoutColumns>
            <layoutItems>
                <behavior>Required</behavior>
                <field>Name</field>
            </layoutItems>
            <layoutItems>
                <behavior>Edit</behavior>
                <field>Acme_Status__c</field>
            </layoutItems>
        </layoutColumns>
        <layoutColumns>
            <layoutItems>
                <behavior>Readonly</behavior>
                <field>OwnerId</field>
            </layoutItems>
            <layoutItems>
                <emptySpace>true</emptySpace>
            </layoutItems>
        </layoutColumns>
    </layoutSections>
    <layoutSections>
        <label>System</label>
        <style>OneColumn</style>
        <layoutColumns>
            <layoutItems>
                <behavior>Readonly</behavior>
                <field>CreatedById</field>
            </layoutItems>
        </layoutColumns>
    </layoutSections>
    <relatedLists>
        <fields>FULL_NAME</fields>
        <fields>CONTACT.EMAIL</fields>
        <relatedList>RelatedContactList</relatedList>
    </relatedLists>
    <quickActionList>
        <quickActionListItems>
            <quickActionName>FeedItem.TextPost</quickActionName>
        </quickActionListItems>
    </quickActionList>
</Layout>
"#;

#[test]
fn layout_keeps_the_field_skeleton() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "layouts/Account-Partner Layout.layout-meta.xml", LAYOUT);
    let layout = single(MetadataKind::Layout, tmp.path(), &file);

    assert_eq!(layout.pattern_type, PatternType::LayoutDefinition);
    assert_eq!(layout.name, "Layout: Account - Partner Layout");
    assert_eq!(layout.source_object, "Account");
    assert_eq!(layout.description, "Page layout for Account with 2 sections and 4 fields.");
    assert_eq!(
        layout.field_references,
        vec!["Brand_A_Status__c", "CreatedById", "Name", "OwnerId"]
    );

    let s = &layout.structure;
    assert_eq!(s["sectionCount"], 2);
    assert_eq!(s["totalFields"], 4);
    assert_eq!(s["sections"][0]["label"], "[LABEL:11chars]");
    assert_eq!(s["sections"][0]["columnCount"], 2);
    assert_eq!(s["sections"][0]["fieldCount"], 3);
    assert_eq!(
        s["sections"][0]["fields"][1],
        json!({"field": "Brand_A_Status__c", "behavior": "Edit"})
    );
    assert_eq!(s["relatedLists"][0]["fields"], json!(["FULL_NAME", "CONTACT.EMAIL"]));
    assert_eq!(s["quickActions"], json!(["FeedItem.TextPost"]));

    assert!(has_tag(&layout, "has-related-lists"));
    assert!(has_tag(&layout, "has-quick-actions"));
    assert!(has_tag(&layout, "account"));
}

#[test]
fn layout_name_without_object_prefix() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "layouts/Standalone.layout-meta.xml", "<Layout/>");
    let layout = single(MetadataKind::Layout, tmp.path(), &file);

    assert_eq!(layout.source_object, "Unknown");
    assert_eq!(layout.name, "Layout: Unknown - Standalone");
    assert_eq!(layout.structure["sectionCount"], 0);
    assert!(!has_tag(&layout, "has-related-lists"));
    assert!(has_tag(&layout, "simple"));
}

// ---- Object ----

#[test]
fn object_keeps_settings_and_custom_overrides() {
    let tmp = TempDir::new().unwrap();
    let file = write(
        tmp.path(),
        "objects/Acme_Program__c/Acme_Program__c.object-meta.xml",
        r#"<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
            <actionOverrides><actionName>View</actionName><type>Default</type></actionOverrides>
            <actionOverrides><actionName>Edit</actionName><type>Flexipage</type></actionOverrides>
            <enableHistory>true</enableHistory>
            <nameField><label>Program Name</label><type>AutoNumber</type></nameField>
            <sharingModel>Private</sharingModel>
        </CustomObject>"#,
    );
    let object = single(MetadataKind::Object, tmp.path(), &file);

    assert_eq!(object.pattern_type, PatternType::ObjectDefinition);
    assert_eq!(object.category, PatternCategory::DataModel);
    assert_eq!(object.name, "Object: Acme_Program__c");
    assert_eq!(object.field_references, vec!["Brand_A_Program__c"]);

    let s = &object.structure;
    assert_eq!(s["objectName"], "Brand_A_Program__c");
    assert_eq!(s["nameFieldType"], "AutoNumber");
    assert_eq!(s["actionOverrides"], json!(["Edit:Flexipage"]));
    assert_eq!(s["sharingModel"], "Private");
    assert_eq!(s["enableHistory"], "true");
    assert_eq!(s["enableSearch"], "");
}

// ---- Field ----

#[test]
fn lookup_field() {
    let tmp = TempDir::new().unwrap();
    let file = write(
        tmp.path(),
        "main/default/objects/Contact/fields/Acme_Partner__c.field-meta.xml",
        r#"<CustomField xmlns="http://soap.sforce.com/2006/04/metadata">
            <fullName>Acme_Partner__c</fullName>
            <label>Partner</label>
            <type>Lookup</type>
            <referenceTo>Account</referenceTo>
            <relationshipName>Acme_Partners</relationshipName>
            <deleteConstraint>SetNull</deleteConstraint>
            <required>false</required>
        </CustomField>"#,
    );
    let field = single(MetadataKind::Field, tmp.path(), &file);

    assert_eq!(field.pattern_type, PatternType::FieldDefinition);
    assert_eq!(field.name, "Field: Contact.Acme_Partner__c");
    assert_eq!(field.source_object, "Contact");
    assert_eq!(field.description, "Lookup field on Contact (lookup to Account).");
    assert_eq!(field.field_references, vec!["Contact.Brand_A_Partner__c", "Account"]);

    let s = &field.structure;
    assert_eq!(s["fieldName"], "Brand_A_Partner__c");
    assert_eq!(s["referenceTo"], "Account");
    assert_eq!(s["relationshipName"], "Brand_A_Partners");
    assert_eq!(s["deleteConstraint"], "SetNull");
    assert_eq!(s["required"], false);
    assert!(s.get("isFormula").is_none());
    assert!(s.get("length").is_none());

    assert!(has_tag(&field, "type:lookup"));
    assert!(has_tag(&field, "lookup"));
    assert!(has_tag(&field, "contact"));
}

#[test]
fn formula_field_outside_objects_directory() {
    let tmp = TempDir::new().unwrap();
    let file = write(
        tmp.path(),
        "loose/Score__c.field-meta.xml",
        r#"<CustomField>
            <type>Number</type>
            <precision>18</precision>
            <scale>2</scale>
            <formula>Amount__c * 2</formula>
            <formulaTreatBlanksAs>BlankAsZero</formulaTreatBlanksAs>
        </CustomField>"#,
    );
    let field = single(MetadataKind::Field, tmp.path(), &file);

    assert_eq!(field.name, "Field: Score__c");
    assert_eq!(field.source_object, "Unknown");
    assert_eq!(field.description, "Number field.");
    assert_eq!(field.field_references, vec!["Score__c"]);
    assert_eq!(field.structure["isFormula"], true);
    assert_eq!(field.structure["formulaReturnType"], "BlankAsZero");
    assert_eq!(field.structure["precision"], "18");
    assert_eq!(field.structure["scale"], "2");
    assert!(has_tag(&field, "formula-field"));
    assert!(!has_tag(&field, "lookup"));
}

// ---- Non-matching input ----

#[test]
fn unexpected_root_yields_nothing() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "reports/Odd.report-meta.xml", "<Flow><label>x</label></Flow>");
    assert!(extract(MetadataKind::Report, tmp.path(), &file).is_empty());
}

#[test]
fn test_classes_without_methods_yield_nothing() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "classes/EmptyTest.cls", "@isTest\nprivate class EmptyTest {}\n");
    assert!(extract(MetadataKind::Apex, tmp.path(), &file).is_empty());
}

#[test]
fn lwc_test_modules_yield_nothing() {
    let tmp = TempDir::new().unwrap();
    let file = write(
        tmp.path(),
        "lwc/tierBadge/__tests__/tierBadge.js",
        "import { createElement } from 'lwc';",
    );
    assert!(extract(MetadataKind::Lwc, tmp.path(), &file).is_empty());
}

#[test]
fn malformed_xml_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    let file = write(tmp.path(), "flows/Broken.flow-meta.xml", "<Flow><decisions></Flow>");
    let scrubber = acme_scrubber();
    let ctx = ExtractionContext::new(&scrubber, HASH, tmp.path());
    let err = extractor_for(MetadataKind::Flow).extract(&file, &ctx).unwrap_err();
    assert_eq!(err.error_code(), "PARSE_ERROR");
    assert!(err.coded_string().starts_with("[PARSE_ERROR] "));
}
