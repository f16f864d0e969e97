//! Field-reference extraction from formulas and queries.

use std::collections::BTreeSet;

use super::patterns::{RE_CUSTOM_FIELD, RE_GLOBAL_FIELD, RE_OBJECT_FIELD};
use super::BrandScrubber;

/// Field references in a formula, brand-scrubbed, sorted and de-duplicated.
///
/// Picks up custom `Name__c` / `Name__r` tokens, the field part of
/// `$Object.Field` globals, and `Object.Field` pairs where both halves start
/// with a capital.
pub fn extract_field_refs_from_formula(formula: &str, scrubber: &BrandScrubber) -> Vec<String> {
    let mut fields = BTreeSet::new();

    if let Some(re) = RE_CUSTOM_FIELD.as_ref() {
        for caps in re.captures_iter(formula) {
            fields.insert(scrubber.scrub(&caps[1]));
        }
    }
    if let Some(re) = RE_GLOBAL_FIELD.as_ref() {
        for caps in re.captures_iter(formula) {
            fields.insert(scrubber.scrub(&caps[1]));
        }
    }
    if let Some(re) = RE_OBJECT_FIELD.as_ref() {
        for caps in re.captures_iter(formula) {
            fields.insert(scrubber.scrub(&format!("{}.{}", &caps[1], &caps[2])));
        }
    }

    fields.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_up_all_reference_shapes() {
        let scrubber = BrandScrubber::new();
        let refs = extract_field_refs_from_formula(
            "AND(ISBLANK(Email__c), $User.ProfileId <> Account.OwnerId, Parent__r.Name)",
            &scrubber,
        );
        assert_eq!(
            refs,
            vec![
                "Account.OwnerId",
                "Email__c",
                "Parent__r",
                "Parent__r.Name",
                "ProfileId",
                "User.ProfileId",
            ]
        );
    }

    #[test]
    fn references_are_scrubbed() {
        let mut scrubber = BrandScrubber::new();
        scrubber.add_terms(["Acme"]);
        let refs = extract_field_refs_from_formula("Acme_Tier__c > 2", &scrubber);
        assert_eq!(refs, vec!["Brand_A_Tier__c"]);
    }
}
