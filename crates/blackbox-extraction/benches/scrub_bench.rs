//! Anonymization and scan benchmarks.
//!
//! Benchmarks: brand scrubbing by term count, structure anonymization, and a
//! full project scan over generated custom fields.
//! Run with: cargo bench -p blackbox-extraction --bench scrub_bench

use std::fs;
use std::sync::Arc;

use blackbox_core::config::BlackboxConfig;
use blackbox_extraction::{BrandScrubber, CompanyDictionary, ProjectScanner, StructuralAnonymizer};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use tempfile::TempDir;

const TEXT: &str = "Record Update on Acme_Account__c: set Acme_Tier__c from \
    $Record.Globex_Region__c when Initech_Status__c changes; notify owner@acme.com";

fn scrubber_with(terms: usize) -> BrandScrubber {
    let mut scrubber = BrandScrubber::new();
    scrubber.add_terms(["Acme", "Globex", "Initech"]);
    scrubber.add_terms((0..terms).map(|i| format!("Brandterm{i}")));
    scrubber
}

fn nested_structure(depth: usize) -> Value {
    (0..depth).fold(json!({"field": "Acme_Tier__c"}), |inner, i| {
        json!({
            "label": format!("Section {i}"),
            "object": "Acme_Program__c",
            "conditions": [
                {"leftValueReference": "$Record.Acme_Status__c", "operator": "EqualTo"},
                {"leftValueReference": "Globex_Region__c", "rightValue": "https://acme.example.com"},
            ],
            "child": inner,
        })
    })
}

/// A project with `count` custom fields spread across ten objects.
fn create_project(count: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..count {
        let fields = dir
            .path()
            .join(format!("force-app/main/default/objects/Object{}__c/fields", i % 10));
        fs::create_dir_all(&fields).unwrap();
        let xml = format!(
            "<CustomField><fullName>Acme_Field{i}__c</fullName><type>Text</type>\
             <length>255</length></CustomField>"
        );
        fs::write(fields.join(format!("Acme_Field{i}__c.field-meta.xml")), xml).unwrap();
    }
    dir
}

fn scrub(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrub");
    for terms in [0, 50, 500] {
        let scrubber = scrubber_with(terms);
        group.bench_with_input(BenchmarkId::new("text", terms), &terms, |b, _| {
            b.iter(|| scrubber.scrub(TEXT));
        });
    }
    group.finish();
}

fn anonymize_structure(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonymize_structure");
    let scrubber = scrubber_with(0);
    let anonymizer = StructuralAnonymizer::new(&scrubber);
    for depth in [1, 8, 32] {
        let structure = nested_structure(depth);
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, _| {
            b.iter(|| anonymizer.anonymize_structure(&structure, ""));
        });
    }
    group.finish();
}

fn project_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("project_scan");
    group.sample_size(10);
    for size in [100, 1000] {
        let dir = create_project(size);
        let scanner = ProjectScanner::new(BlackboxConfig::default())
            .with_dictionary(Arc::new(CompanyDictionary::empty()));
        group.bench_with_input(BenchmarkId::new("fields", size), &size, |b, _| {
            b.iter(|| scanner.scan(dir.path()));
        });
    }
    group.finish();
}

criterion_group!(benches, scrub, anonymize_structure, project_scan);
criterion_main!(benches);
