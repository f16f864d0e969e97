//! Brand detection and scrubbing.
//!
//! A `BrandScrubber` maps organization-identifying terms to generic labels
//! (`Brand_A`, `Brand_B`, ...). Terms come from configuration or from
//! `auto_detect_brands`, which mines custom field names with three
//! strategies: cross-object prefixes, managed-package namespaces, and the
//! company dictionary.

use std::collections::BTreeSet;

use aho_corasick::{AhoCorasick, MatchKind};
use blackbox_core::constants::UNKNOWN_OBJECT;
use blackbox_core::types::collections::{fx_map_with_capacity, FxHashMap, FxHashSet};

use super::dictionary::CompanyDictionary;
use super::patterns::{self, RE_CAMEL_TRANSITION, RE_CAPS_THEN_LOWER, RE_NAMESPACED_FIELD};
use super::stoplists::Stoplists;

/// Leading word of every generic label.
const LABEL_PREFIX: &str = "Brand";

/// Placeholder for a match whose casing has no registered variant.
const UNKNOWN_BRAND: &str = "[BRAND]";

/// Minimum length of the first field segment to be a prefix candidate.
const MIN_PREFIX_LEN: usize = 4;

/// Minimum length of any later field segment to be a candidate.
const MIN_SEGMENT_LEN: usize = 5;

/// Prefix candidates must appear on at least this many objects.
const MIN_OBJECT_BREADTH: usize = 2;

/// Per-scan registry of brand terms and their generic labels.
#[derive(Debug, Clone)]
pub struct BrandScrubber {
    brand_map: FxHashMap<String, String>,
    counter: usize,
    matcher: Option<AhoCorasick>,
    stoplists: Stoplists,
}

impl Default for BrandScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl BrandScrubber {
    /// An empty scrubber using the built-in stoplists.
    pub fn new() -> Self {
        Self::with_stoplists(Stoplists::builtin())
    }

    pub fn with_stoplists(stoplists: Stoplists) -> Self {
        Self {
            brand_map: FxHashMap::default(),
            counter: 0,
            matcher: None,
            stoplists,
        }
    }

    pub fn stoplists(&self) -> &Stoplists {
        &self.stoplists
    }

    /// Every registered spelling and its label.
    pub fn brand_map(&self) -> &FxHashMap<String, String> {
        &self.brand_map
    }

    /// Label for `term`, trying the exact spelling first, then lowercase.
    pub fn label_for(&self, term: &str) -> Option<&str> {
        self.brand_map
            .get(term)
            .or_else(|| self.brand_map.get(&term.to_lowercase()))
            .map(String::as_str)
    }

    /// Number of distinct terms registered.
    pub fn term_count(&self) -> usize {
        self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.brand_map.is_empty()
    }

    /// Register terms. Each new term gets the next label, shared with its
    /// lowercase and uppercase spellings. Blank and known terms are skipped.
    pub fn add_terms<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim();
            if term.is_empty() || self.brand_map.contains_key(term) {
                continue;
            }
            if collides_with_labels(term) {
                tracing::debug!(term, "skipping term that would match inside a label");
                continue;
            }
            self.counter += 1;
            let label = generic_label(self.counter);
            for variant in [term.to_string(), term.to_lowercase(), term.to_uppercase()] {
                self.brand_map.entry(variant).or_insert_with(|| label.clone());
            }
        }
        self.rebuild_matcher();
    }

    fn rebuild_matcher(&mut self) {
        let mut seen = FxHashSet::default();
        let needles: Vec<String> = self
            .brand_map
            .keys()
            .map(|k| k.to_ascii_lowercase())
            .filter(|k| seen.insert(k.clone()))
            .collect();
        if needles.is_empty() {
            self.matcher = None;
            return;
        }
        self.matcher = match AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&needles)
        {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::error!(error = %e, "failed to build brand matcher; scrubbing disabled");
                None
            }
        };
    }

    /// Replace every registered term in `text` with its label.
    ///
    /// Matching is case-insensitive and prefers the longest term at the
    /// leftmost position. A match counts only when no ASCII letter touches
    /// either end, so `Dev` never matches inside `DeveloperName` while
    /// `Acme_Status__c` still matches `Acme`.
    pub fn scrub(&self, text: &str) -> String {
        let Some(matcher) = self.matcher.as_ref() else {
            return text.to_string();
        };
        if text.is_empty() {
            return String::new();
        }
        let bytes = text.as_bytes();
        let mut candidates: Vec<(usize, usize)> = matcher
            .find_overlapping_iter(text)
            .map(|m| (m.start(), m.end()))
            .filter(|&(start, end)| {
                let clear_before = start == 0 || !bytes[start - 1].is_ascii_alphabetic();
                let clear_after = end == bytes.len() || !bytes[end].is_ascii_alphabetic();
                clear_before && clear_after
            })
            .collect();
        if candidates.is_empty() {
            return text.to_string();
        }
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        for (start, end) in candidates {
            if start < pos {
                continue;
            }
            out.push_str(&text[pos..start]);
            out.push_str(self.replacement(&text[start..end]));
            pos = end;
        }
        out.push_str(&text[pos..]);
        out
    }

    fn replacement(&self, matched: &str) -> &str {
        self.brand_map
            .get(matched)
            .or_else(|| self.brand_map.get(&matched.to_lowercase()))
            .or_else(|| self.brand_map.get(&capitalize(matched)))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_BRAND)
    }

    /// Mine `Object.Field__c` names for brand terms, register them, and
    /// return them in priority order.
    pub fn auto_detect_brands<S: AsRef<str>>(
        &mut self,
        field_names: &[S],
        dictionary: &CompanyDictionary,
    ) -> Vec<String> {
        let mut prefix_objects: FxHashMap<String, FxHashSet<String>> =
            fx_map_with_capacity(field_names.len());
        let mut namespaces: BTreeSet<String> = BTreeSet::new();
        let mut dict_matches: BTreeSet<String> = BTreeSet::new();

        for qualified in field_names {
            let qualified = qualified.as_ref();
            let (object, field) = qualified.split_once('.').unwrap_or((UNKNOWN_OBJECT, qualified));
            if !field.ends_with("__c") && !field.ends_with("__r") {
                continue;
            }

            if let Some(caps) = RE_NAMESPACED_FIELD.as_ref().and_then(|re| re.captures(field)) {
                let ns = &caps[1];
                if !self.stoplists.is_structural(ns)
                    && !self.stoplists.is_ecosystem_term(ns)
                    && self.looks_like_brand_name(ns)
                {
                    namespaces.insert(ns.to_string());
                }
                continue;
            }

            let bare = field.replace("__c", "").replace("__r", "");
            let parts: Vec<&str> = bare.split('_').collect();

            for (i, part) in parts.iter().enumerate() {
                let min_len = if i == 0 { MIN_PREFIX_LEN } else { MIN_SEGMENT_LEN };
                if self.is_heuristic_candidate(part, min_len) {
                    prefix_objects
                        .entry(part.to_string())
                        .or_default()
                        .insert(object.to_string());
                }
            }

            for found in dictionary.find_company_matches(&parts, &self.stoplists) {
                if !self.stoplists.is_structural(&found) && !self.stoplists.is_ecosystem_term(&found) {
                    dict_matches.insert(found);
                }
            }
        }

        let mut heuristic: Vec<(String, usize)> = prefix_objects
            .into_iter()
            .map(|(term, objects)| (term, objects.len()))
            .filter(|(_, breadth)| *breadth >= MIN_OBJECT_BREADTH)
            .collect();
        heuristic.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut seen_lower: FxHashSet<String> = FxHashSet::default();
        let detected: Vec<String> = heuristic
            .into_iter()
            .map(|(term, _)| term)
            .chain(namespaces)
            .chain(dict_matches)
            .filter(|term| !collides_with_labels(term))
            .filter(|term| seen_lower.insert(term.to_lowercase()))
            .collect();

        tracing::debug!(
            fields = field_names.len(),
            detected = detected.len(),
            "brand auto-detection finished"
        );
        if !detected.is_empty() {
            self.add_terms(&detected);
        }
        detected
    }

    /// Candidate for the cross-object prefix strategy.
    ///
    /// Besides brand-shaped tokens, a single capitalised word that appears on
    /// none of the stoplists qualifies; the object-breadth requirement is
    /// what keeps coincidental words out.
    fn is_heuristic_candidate(&self, part: &str, min_len: usize) -> bool {
        if part.chars().count() < min_len
            || collides_with_labels(part)
            || self.stoplists.is_structural(part)
            || self.stoplists.is_ecosystem_term(part)
            || self.stoplists.is_standard_object(part)
            || self.stoplists.is_standard_field(part)
        {
            return false;
        }
        self.looks_like_brand_name(part) || self.is_unlisted_proper_word(part)
    }

    fn is_unlisted_proper_word(&self, part: &str) -> bool {
        let mut chars = part.chars();
        let capitalised = chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_lowercase());
        capitalised && !self.stoplists.is_common_word(part) && !self.stoplists.is_too_common(part)
    }

    /// Whether a token is shaped like a product or company name.
    ///
    /// Requires an inner lower→upper transition, two or more capitals
    /// followed by lowercase (tokens of 6+ chars), or a mix of letters and
    /// digits. Camel-case tokens of three or more sub-words made up entirely
    /// of common words (`CreatedById`) are rejected.
    pub fn looks_like_brand_name(&self, term: &str) -> bool {
        let has_camel = patterns::is_match(&RE_CAMEL_TRANSITION, term);
        let has_caps_lower =
            patterns::is_match(&RE_CAPS_THEN_LOWER, term) && term.chars().count() >= 6;
        let has_mixed_digits = term.chars().any(|c| c.is_ascii_alphabetic())
            && term.chars().any(|c| c.is_ascii_digit());

        if !(has_camel || has_caps_lower || has_mixed_digits) {
            return false;
        }

        if has_camel || has_caps_lower {
            let parts = patterns::split_camel_case(term);
            if parts.len() >= 3
                && parts.iter().all(|p| {
                    self.stoplists.is_common_word(p)
                        || self.stoplists.is_standard_object(p)
                        || self.stoplists.is_standard_field(p)
                })
            {
                return false;
            }
        }
        true
    }
}

/// `Brand_A` ... `Brand_Z`, then `Brand_27`, `Brand_28`, ...
pub fn generic_label(n: usize) -> String {
    match u8::try_from(n) {
        Ok(k @ 1..=26) => format!("{LABEL_PREFIX}_{}", char::from(b'A' + k - 1)),
        _ => format!("{LABEL_PREFIX}_{n}"),
    }
}

/// Whether a registered `term` could match inside a label and make
/// scrubbing non-idempotent: the label word itself (`Brand`, `brand_7`)
/// or anything with fewer than two letters (`A`, `27`).
fn collides_with_labels(term: &str) -> bool {
    if term.chars().filter(char::is_ascii_alphabetic).count() < 2 {
        return true;
    }
    match (term.get(..LABEL_PREFIX.len()), term.get(LABEL_PREFIX.len()..)) {
        (Some(head), Some(rest)) => {
            head.eq_ignore_ascii_case(LABEL_PREFIX)
                && !rest.starts_with(|c: char| c.is_ascii_alphabetic())
        }
        _ => false,
    }
}

/// First character uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(generic_label(1), "Brand_A");
        assert_eq!(generic_label(26), "Brand_Z");
        assert_eq!(generic_label(27), "Brand_27");
    }

    #[test]
    fn label_shaped_terms_are_never_registered() {
        let mut s = BrandScrubber::new();
        s.add_terms(["Brand", "BRAND_A", "brand7", "A", "27", "Brandwise"]);
        assert_eq!(s.term_count(), 1);
        assert_eq!(s.label_for("Brandwise"), Some("Brand_A"));
        assert_eq!(s.scrub("Brand_A_Tier__c"), "Brand_A_Tier__c");
    }

    #[test]
    fn label_word_fields_are_not_detected() {
        let mut s = BrandScrubber::new();
        let found = s.auto_detect_brands(
            &["Account.Brand_Name__c", "Product2.Brand_Tier__c", "Account.Brand_A_Region__c"],
            &CompanyDictionary::from_names(["brand"]),
        );
        assert!(found.is_empty(), "detected {found:?}");
        assert!(s.is_empty());

        s.add_terms(["Acme"]);
        let once = s.scrub("Acme_Name__c and Brand_Tier__c");
        assert_eq!(once, "Brand_A_Name__c and Brand_Tier__c");
        assert_eq!(s.scrub(&once), once);
    }

    #[test]
    fn variants_share_a_label() {
        let mut s = BrandScrubber::new();
        s.add_terms(["AcmeCloud", "  ", "AcmeCloud", "WidgetCo"]);
        assert_eq!(s.term_count(), 2);
        assert_eq!(s.label_for("AcmeCloud"), Some("Brand_A"));
        assert_eq!(s.label_for("ACMECLOUD"), Some("Brand_A"));
        assert_eq!(s.label_for("acmecloud"), Some("Brand_A"));
        assert_eq!(s.label_for("WidgetCo"), Some("Brand_B"));
    }

    #[test]
    fn scrub_respects_letter_boundaries() {
        let mut s = BrandScrubber::new();
        s.add_terms(["Dev"]);
        assert_eq!(s.scrub("DeveloperName"), "DeveloperName");
        assert_eq!(s.scrub("Dev_Status__c"), "Brand_A_Status__c");
        assert_eq!(s.scrub("dev2"), "Brand_A2");
    }

    #[test]
    fn scrub_prefers_longest_term() {
        let mut s = BrandScrubber::new();
        s.add_terms(["Acme", "Acme_Cloud"]);
        assert_eq!(s.scrub("Acme_Cloud_Id__c"), "Brand_B_Id__c");
        assert_eq!(s.scrub("Acme_Tier__c"), "Brand_A_Tier__c");
    }

    #[test]
    fn scrub_falls_back_on_odd_casing() {
        let mut s = BrandScrubber::new();
        s.add_terms(["AcmeCloud"]);
        assert_eq!(s.scrub("aCMEcLOUD rocks"), "Brand_A rocks");
    }

    #[test]
    fn empty_scrubber_is_identity() {
        let s = BrandScrubber::new();
        assert_eq!(s.scrub("Anything_Goes__c"), "Anything_Goes__c");
    }

    #[test]
    fn brand_shape() {
        let s = BrandScrubber::new();
        assert!(s.looks_like_brand_name("AcmeCloud"));
        assert!(s.looks_like_brand_name("NOVATech"));
        assert!(s.looks_like_brand_name("mkto71"));
        assert!(!s.looks_like_brand_name("Acme"));
        assert!(!s.looks_like_brand_name("IsPastUser"));
        assert!(!s.looks_like_brand_name("CreatedById"));
    }

    #[test]
    fn heuristic_needs_two_objects() {
        let mut s = BrandScrubber::new();
        let found = s.auto_detect_brands(
            &["Account.Zorbix_Level__c", "Account.Zorbix_Score__c"],
            &CompanyDictionary::empty(),
        );
        assert!(found.is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn namespaces_are_detected_without_breadth() {
        let mut s = BrandScrubber::new();
        let found = s.auto_detect_brands(&["Account.acme2__Score__c"], &CompanyDictionary::empty());
        assert_eq!(found, vec!["acme2"]);
    }

    #[test]
    fn ecosystem_namespaces_are_skipped() {
        let mut s = BrandScrubber::new();
        let found = s.auto_detect_brands(&["Lead.mkto71__Score__c"], &CompanyDictionary::empty());
        assert!(found.is_empty());
    }

    #[test]
    fn dictionary_matches_come_last() {
        let mut s = BrandScrubber::new();
        let dict = CompanyDictionary::from_names(["globex"]);
        let found = s.auto_detect_brands(
            &[
                "Account.Globex_Region__c",
                "Account.AcmeCloud_Tier__c",
                "Opportunity.AcmeCloud_Tier__c",
            ],
            &dict,
        );
        assert_eq!(found, vec!["AcmeCloud", "Globex"]);
        assert_eq!(s.scrub("Globex_Region__c"), "Brand_B_Region__c");
    }
}
