use chatlink_core::{generate_variations, match_contacts, CrmContact, ParsedNumber, VariationSet};
use std::collections::BTreeMap;

fn fields() -> Vec<String> {
    vec!["phone".to_string(), "mobilephone".to_string()]
}

#[test]
fn parsed_numbers_keep_raw_and_canonical_forms() {
    for raw in ["14155552671", "+442071838750", "5511987654321", "+919876543210"] {
        let set = generate_variations(raw).expect("variations");
        let parsed = ParsedNumber::parse(&format!("+{}", raw.trim_start_matches('+'))).expect("parse");
        assert!(set.contains(raw), "{raw} missing from its own set");
        assert!(set.contains(parsed.e164()), "{raw} missing e164");
    }
}

#[test]
fn brazil_legacy_and_modern_forms_overlap() {
    let modern = generate_variations("5511987654321").expect("variations");
    let legacy = generate_variations("551187654321").expect("variations");
    let shared: Vec<&String> = modern.intersection(&legacy).collect();
    assert!(shared.iter().any(|value| value.as_str() == "+5511987654321"));
    assert!(shared.iter().any(|value| value.as_str() == "+551187654321"));
}

#[test]
fn brazil_contact_matches_either_representation() {
    let contact = CrmContact::new("br-1").with_field("mobilephone", "(11) 98765-4321");
    for raw in ["5511987654321", "551187654321"] {
        let mut phones = BTreeMap::new();
        phones.insert(raw.to_string(), generate_variations(raw).expect("variations"));
        let matches = match_contacts(&phones, std::slice::from_ref(&contact), &fields());
        assert_eq!(
            matches.get(raw).map(|found| found.contact_id.as_str()),
            Some("br-1"),
            "{raw} did not match"
        );
    }
}

#[test]
fn us_chat_identifier_matches_hand_entered_mobile() {
    let raw = "14155552671";
    let mut phones: BTreeMap<String, VariationSet> = BTreeMap::new();
    phones.insert(raw.to_string(), generate_variations(raw).expect("variations"));
    let contacts = vec![
        CrmContact::new("other").with_field("phone", "+1 212 555 0000"),
        CrmContact::new("target").with_field("mobilephone", "(415) 555-2671"),
    ];
    let matches = match_contacts(&phones, &contacts, &fields());
    assert_eq!(matches[raw].contact_id, "target");
}
