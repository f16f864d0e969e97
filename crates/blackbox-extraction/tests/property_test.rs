//! Property tests for brand scrubbing, structural anonymization and
//! complexity banding.

use blackbox_extraction::anonymizer::brand::generic_label;
use blackbox_extraction::anonymizer::{BrandScrubber, StructuralAnonymizer};
use blackbox_extraction::complexity::{ComplexityFactors, ComplexityScorer, Factor};
use proptest::prelude::*;

const FACTORS: [Factor; 10] = [
    Factor::Decisions,
    Factor::Loops,
    Factor::RecordOps,
    Factor::Screens,
    Factor::Conditions,
    Factor::Formulas,
    Factor::Fields,
    Factor::Elements,
    Factor::NestingDepth,
    Factor::Subflows,
];

fn scrubber_for(terms: &[String]) -> BrandScrubber {
    let mut scrubber = BrandScrubber::new();
    scrubber.add_terms(terms);
    scrubber
}

/// Lowercase words, occasionally the label word itself.
fn term_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof![4 => "[a-z]{4,8}", 1 => Just("brand".to_string())], 1..4)
}

fn letter_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphabetic()).filter(|run| !run.is_empty())
}

// ── Brand scrubbing ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn scrubbing_is_idempotent(
        terms in term_strategy(),
        prefix in "[A-Za-z_ .]{0,20}",
        suffix in "[A-Za-z_ .]{0,20}",
    ) {
        let scrubber = scrubber_for(&terms);
        let text = format!("{prefix} {}_Field__c {suffix}", terms[0].to_uppercase());

        let once = scrubber.scrub(&text);
        let twice = scrubber.scrub(&once);
        prop_assert_eq!(&once, &twice, "not idempotent for {:?}", text);
    }

    #[test]
    fn no_registered_term_survives(
        terms in term_strategy(),
        words in prop::collection::vec("[A-Za-z]{1,10}", 0..6),
    ) {
        let scrubber = scrubber_for(&terms);
        prop_assert!(scrubber.label_for("brand").is_none());
        let mut parts = words.clone();
        parts.extend(terms.iter().cloned());
        let text = parts.join("_");

        let scrubbed = scrubber.scrub(&text);
        for run in letter_runs(&scrubbed) {
            prop_assert!(
                !terms
                    .iter()
                    .any(|t| scrubber.label_for(t).is_some() && t.eq_ignore_ascii_case(run)),
                "term {:?} survived in {:?}",
                run,
                scrubbed
            );
        }
    }

    #[test]
    fn field_names_keep_their_shape(
        object in "[A-Z][a-z]{3,8}",
        rest in "[A-Z][a-z]{3,8}",
        suffix in prop::sample::select(vec!["__c", "__r"]),
    ) {
        let scrubber = scrubber_for(&["Acme".to_string()]);
        let anonymizer = StructuralAnonymizer::new(&scrubber);
        let field = format!("{object}.Acme_{rest}{suffix}");

        let anonymized = anonymizer.anonymize_field_name(&field);
        prop_assert!(anonymized.ends_with(suffix));
        prop_assert_eq!(anonymized.matches('.').count(), 1);
        prop_assert!(letter_runs(&anonymized).all(|run| !run.eq_ignore_ascii_case("acme")));
    }

    #[test]
    fn labels_are_distinct(a in 1usize..200, b in 1usize..200) {
        prop_assume!(a != b);
        prop_assert_ne!(generic_label(a), generic_label(b));
        prop_assert!(generic_label(a).starts_with("Brand_"));
    }
}

// ── Complexity ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn banding_is_monotonic(a in 0.0f64..100.0, b in 0.0f64..100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (band_lo, band_hi) = (ComplexityScorer::band(lo), ComplexityScorer::band(hi));
        prop_assert!(band_lo <= band_hi);
        prop_assert!((1..=5).contains(&band_lo) && (1..=5).contains(&band_hi));
    }

    #[test]
    fn adding_factors_never_lowers_the_score(
        counts in prop::collection::vec((0usize..FACTORS.len(), 0usize..20), 0..8),
        extra in 0usize..FACTORS.len(),
        extra_count in 1usize..10,
    ) {
        let factors = counts
            .iter()
            .fold(ComplexityFactors::new(), |acc, &(i, n)| acc.with(FACTORS[i], n));
        let before = ComplexityScorer::score(&factors);
        let after = ComplexityScorer::score(&factors.clone().with(FACTORS[extra], extra_count));
        prop_assert!(after >= before);
    }
}
