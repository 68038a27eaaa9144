use crate::domain::{digits_only, CrmContact, VariationSet};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMatch {
    pub contact_id: String,
    pub contact: CrmContact,
}

/// Raw phone (never a variation) to its matched contact. Phones without a match are absent.
pub type PhoneToContactMap = BTreeMap<String, ContactMatch>;

/// Drops repeated identifiers, keeping the first occurrence and its fields.
pub fn dedup_contacts(contacts: &[CrmContact]) -> Vec<&CrmContact> {
    let mut seen = HashSet::new();
    contacts
        .iter()
        .filter(|contact| seen.insert(contact.id.as_str()))
        .collect()
}

/// Finds the contact for each raw phone.
///
/// Values are compared verbatim first, then with every non-digit stripped from
/// both sides. When several contacts match, the first in de-duplicated order
/// wins; callers wanting another preference must order `contacts` themselves.
/// The same contact may be the match for several raw phones.
pub fn match_contacts(
    phone_to_variations: &BTreeMap<String, VariationSet>,
    contacts: &[CrmContact],
    phone_fields: &[String],
) -> PhoneToContactMap {
    let contacts = dedup_contacts(contacts);
    let mut matches = PhoneToContactMap::new();
    if contacts.is_empty() {
        return matches;
    }

    for (phone, variations) in phone_to_variations {
        if variations.is_empty() {
            continue;
        }
        let found = find_exact(variations, &contacts, phone_fields)
            .or_else(|| find_by_digits(variations, &contacts, phone_fields));
        if let Some(contact) = found {
            matches.insert(
                phone.clone(),
                ContactMatch {
                    contact_id: contact.id.clone(),
                    contact: contact.clone(),
                },
            );
        }
    }

    matches
}

fn find_exact<'a>(
    variations: &VariationSet,
    contacts: &[&'a CrmContact],
    phone_fields: &[String],
) -> Option<&'a CrmContact> {
    contacts.iter().copied().find(|contact| {
        contact
            .phone_values(phone_fields)
            .any(|value| variations.contains(value))
    })
}

fn find_by_digits<'a>(
    variations: &VariationSet,
    contacts: &[&'a CrmContact],
    phone_fields: &[String],
) -> Option<&'a CrmContact> {
    let wanted: HashSet<String> = variations.iter().filter_map(|value| digits_only(value)).collect();
    if wanted.is_empty() {
        return None;
    }
    contacts.iter().copied().find(|contact| {
        contact
            .phone_values(phone_fields)
            .filter_map(digits_only)
            .any(|digits| wanted.contains(&digits))
    })
}

#[cfg(test)]
mod tests {
    use super::{dedup_contacts, match_contacts};
    use crate::domain::{CrmContact, VariationSet};
    use std::collections::{BTreeMap, HashSet};

    fn fields() -> Vec<String> {
        vec!["phone".to_string(), "mobilephone".to_string()]
    }

    fn variations(values: &[&str]) -> VariationSet {
        let mut set = VariationSet::new();
        set.extend(values.iter().map(|value| value.to_string()));
        set
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let contacts = vec![
            CrmContact::new("1").with_field("phone", "first"),
            CrmContact::new("2"),
            CrmContact::new("1").with_field("phone", "second"),
        ];
        let deduped = dedup_contacts(&contacts);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].field("phone"), Some("first"));
    }

    #[test]
    fn exact_match_beats_digit_match_on_earlier_contact() {
        let mut phones = BTreeMap::new();
        phones.insert("p".to_string(), variations(&["+14155552671"]));
        let contacts = vec![
            CrmContact::new("digits").with_field("phone", "1 (415) 555 2671"),
            CrmContact::new("exact").with_field("mobilephone", "+14155552671"),
        ];
        let matches = match_contacts(&phones, &contacts, &fields());
        assert_eq!(matches["p"].contact_id, "exact");
    }

    #[test]
    fn digit_pass_tolerates_separators() {
        let mut phones = BTreeMap::new();
        phones.insert("2125552368".to_string(), variations(&["2125552368"]));
        let contacts = vec![CrmContact::new("c").with_field("phone", "(212) 555-2368")];
        let matches = match_contacts(&phones, &contacts, &fields());
        assert_eq!(matches["2125552368"].contact_id, "c");
    }

    #[test]
    fn first_matching_contact_wins() {
        let mut phones = BTreeMap::new();
        phones.insert("p".to_string(), variations(&["555"]));
        let contacts = vec![
            CrmContact::new("a").with_field("phone", "555"),
            CrmContact::new("b").with_field("mobilephone", "555"),
        ];
        let matches = match_contacts(&phones, &contacts, &fields());
        assert_eq!(matches["p"].contact_id, "a");
    }

    #[test]
    fn one_contact_can_match_several_phones() {
        let mut phones = BTreeMap::new();
        phones.insert("+14155552671".to_string(), variations(&["+14155552671"]));
        phones.insert("14155552671".to_string(), variations(&["14155552671"]));
        let contacts = vec![CrmContact::new("same").with_field("phone", "+1 415 555 2671")];
        let matches = match_contacts(&phones, &contacts, &fields());
        assert_eq!(matches.len(), 2);
        assert!(matches.values().all(|found| found.contact_id == "same"));
    }

    #[test]
    fn unmatched_and_empty_phones_are_omitted() {
        let mut phones = BTreeMap::new();
        phones.insert("empty".to_string(), VariationSet::new());
        phones.insert("nobody".to_string(), variations(&["999"]));
        let contacts = vec![CrmContact::new("c").with_field("phone", "123")];
        assert!(match_contacts(&phones, &contacts, &fields()).is_empty());
    }

    #[test]
    fn ignores_fields_outside_the_list() {
        let mut phones = BTreeMap::new();
        phones.insert("p".to_string(), variations(&["123"]));
        let contacts = vec![CrmContact::new("c").with_field("fax", "123")];
        assert!(match_contacts(&phones, &contacts, &fields()).is_empty());
    }

    #[test]
    fn matched_contacts_never_exceed_unique_ids() {
        let mut phones = BTreeMap::new();
        for idx in 0..4 {
            phones.insert(format!("p{idx}"), variations(&[&format!("10{idx}")]));
        }
        let contacts = vec![
            CrmContact::new("x").with_field("phone", "100"),
            CrmContact::new("x").with_field("phone", "101"),
            CrmContact::new("y").with_field("phone", "102"),
            CrmContact::new("y").with_field("phone", "103"),
        ];
        let matches = match_contacts(&phones, &contacts, &fields());
        let distinct: HashSet<&str> = matches.values().map(|found| found.contact_id.as_str()).collect();
        assert!(distinct.len() <= 2);
        assert_eq!(matches.len(), 2);
    }
}
