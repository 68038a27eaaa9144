use crate::domain::{digits_only, ParsedNumber, VariationSet};
use crate::error::{CoreError, Result};
use crate::rules::country::apply_country_heuristics;
use tracing::warn;

/// Expands one raw phone into every string a CRM record might hold for it.
///
/// The input is kept exactly as given, alongside its trimmed form.
/// Unparseable input is not an error: the set degrades to those raw strings
/// and the trimmed string without its leading `+`.
pub fn generate_variations(phone: &str) -> Result<VariationSet> {
    let raw = phone.trim();
    if raw.is_empty() {
        return Err(CoreError::InvalidInput("phone number is empty".to_string()));
    }

    let without_plus = raw.strip_prefix('+').unwrap_or(raw);
    let mut set = VariationSet::new();
    set.insert(phone);
    set.insert(raw);
    set.insert(without_plus);

    let normalized = format!("+{without_plus}");
    let Some(parsed) = ParsedNumber::parse(&normalized) else {
        warn!(phone = %raw, "unable to parse phone number, matching on raw value only");
        return Ok(set);
    };

    let calling_code = parsed.calling_code();
    let national = parsed.national_number();

    set.insert(parsed.e164());
    set.insert(national);
    set.insert(format!("{calling_code}{national}"));
    set.insert(parsed.international());
    set.insert(parsed.national());
    set.insert(format!("0{national}"));
    if let Some(stripped) = national.strip_prefix('0') {
        set.insert(stripped);
    }

    set.extend(apply_country_heuristics(
        parsed.dispatch_country(),
        calling_code,
        national,
    ));
    set.extend(separator_variants(&parsed));

    Ok(set)
}

/// Hand-entered numbers use dots, underscores or nothing at all between groups.
fn separator_variants(parsed: &ParsedNumber) -> Vec<String> {
    let international = parsed.international();
    let national = parsed.national();
    let mut out = vec![
        international.replace('-', "."),
        national.replace('-', "."),
        international.replace([' ', '-'], "_"),
        national.replace([' ', '-'], "_"),
    ];
    if let Some(digits) = digits_only(international) {
        out.push(digits);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::generate_variations;
    use crate::error::CoreError;

    #[test]
    fn us_number_yields_common_formats() {
        let set = generate_variations("14155552671").expect("variations");
        for expected in [
            "14155552671",
            "+14155552671",
            "4155552671",
            "+1 415-555-2671",
            "(415) 555-2671",
            "+1 415.555.2671",
            "+1_415_555_2671",
            "04155552671",
        ] {
            assert!(set.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn unparseable_input_falls_back_to_raw_forms() {
        let set = generate_variations("+abc").expect("variations");
        let values: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(values, vec!["+abc", "abc"]);
    }

    #[test]
    fn untrimmed_input_is_kept_verbatim() {
        let set = generate_variations(" +abc ").expect("variations");
        let values: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(values, vec![" +abc ", "+abc", "abc"]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            generate_variations("   "),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(generate_variations("").is_err());
    }

    #[test]
    fn output_is_deterministic() {
        let first = generate_variations("+5511987654321").expect("variations");
        let second = generate_variations("+5511987654321").expect("variations");
        assert_eq!(first, second);
    }

    #[test]
    fn national_leading_zero_is_stripped_when_present() {
        // Italian fixed lines keep their leading zero in the national number.
        let set = generate_variations("+390612345678").expect("variations");
        assert!(set.contains("0612345678"));
        assert!(set.contains("612345678"));
    }
}
