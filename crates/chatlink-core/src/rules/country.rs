//! Per-country formatting heuristics.
//!
//! Chat identifiers arrive close to E.164 while CRM users type numbers the way
//! they are written locally. Each heuristic turns the parsed parts of a number
//! into extra strings worth searching for. Countries are looked up in
//! [`REGISTRY`]; anything not listed there gets [`generic`].

use crate::domain::ParsedNumber;

pub struct NumberParts<'a> {
    pub calling_code: &'a str,
    pub national_number: &'a str,
}

pub type CountryHeuristic = fn(&NumberParts<'_>) -> Vec<String>;

const REGISTRY: &[(&str, CountryHeuristic)] = &[
    ("BR", brazil),
    ("MX", mexico),
    ("AR", argentina),
    ("CO", colombia),
    ("VE", venezuela),
    ("CI", ivory_coast),
    ("ID", indonesia),
    ("IN", india),
];

const VENEZUELA_AREA_CODES: &[&str] = &["212", "414", "416", "424", "426"];

// Jakarta, Bandung, Semarang, Surabaya, Medan.
const INDONESIA_AREA_CODES: &[&str] = &["21", "22", "24", "31", "61"];

pub fn heuristic_for(country: Option<&str>) -> CountryHeuristic {
    country
        .and_then(|id| {
            REGISTRY
                .iter()
                .find(|(code, _)| code.eq_ignore_ascii_case(id))
                .map(|(_, heuristic)| *heuristic)
        })
        .unwrap_or(generic)
}

pub fn apply_country_heuristics(
    country: Option<&str>,
    calling_code: &str,
    national_number: &str,
) -> Vec<String> {
    let parts = NumberParts {
        calling_code,
        national_number,
    };
    heuristic_for(country)(&parts)
}

/// Pushes a rewritten national number in every shape we search for: bare,
/// prefixed with the calling code, E.164 and the numbering plan's renderings.
fn push_number(out: &mut Vec<String>, calling_code: &str, national_number: &str) {
    out.push(national_number.to_string());
    out.push(format!("{calling_code}{national_number}"));
    out.push(format!("+{calling_code}{national_number}"));
    if let Some(parsed) = ParsedNumber::from_parts(calling_code, national_number) {
        out.push(parsed.e164().to_string());
        out.push(parsed.national().to_string());
        out.push(parsed.international().to_string());
    }
}

fn brazil(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    let mut out = Vec::new();
    match national.len() {
        // Mobiles gained a leading 9 after the area code.
        10 => {
            let modern = format!("{}9{}", &national[..2], &national[2..]);
            push_number(&mut out, parts.calling_code, &modern);
        }
        11 if national.as_bytes()[2] == b'9' => {
            let legacy = format!("{}{}", &national[..2], &national[3..]);
            push_number(&mut out, parts.calling_code, &legacy);
        }
        _ => {}
    }
    out
}

fn mexico(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    let mut out = Vec::new();
    match national.strip_prefix('1') {
        Some(stripped) if national.len() == 11 => {
            push_number(&mut out, parts.calling_code, stripped);
        }
        _ => {
            push_number(&mut out, parts.calling_code, &format!("1{national}"));
        }
    }
    out
}

fn argentina(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    let mut out = Vec::new();
    match national.strip_prefix('9') {
        Some(stripped) => push_number(&mut out, parts.calling_code, stripped),
        None => push_number(&mut out, parts.calling_code, &format!("9{national}")),
    }
    if let Some(local) = national.strip_prefix("15") {
        push_number(&mut out, parts.calling_code, local);
        push_number(&mut out, parts.calling_code, &format!("9{local}"));
    }
    out
}

fn colombia(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    if national.len() != 10 {
        return Vec::new();
    }
    let (area, rest) = (&national[..3], &national[4..]);
    let mut out = Vec::with_capacity(10);
    for carrier in 1..=5 {
        let candidate = format!("{area}{carrier}{rest}");
        out.push(format!("+{}{candidate}", parts.calling_code));
        out.push(candidate);
    }
    out
}

fn venezuela(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    if national.len() != 7 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(VENEZUELA_AREA_CODES.len() * 3);
    for area in VENEZUELA_AREA_CODES {
        let local = format!("{area}{national}");
        out.push(format!("0{local}"));
        out.push(format!("+{}{local}", parts.calling_code));
        out.push(local);
    }
    out
}

fn ivory_coast(parts: &NumberParts<'_>) -> Vec<String> {
    let prefixed = format!("5{}", parts.national_number);
    vec![
        format!("+{}{prefixed}", parts.calling_code),
        format!("{}{prefixed}", parts.calling_code),
        prefixed,
    ]
}

fn indonesia(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    let mut out = Vec::new();
    if !national.starts_with('0') {
        out.push(format!("0{national}"));
    }
    for area in INDONESIA_AREA_CODES {
        if let Some(rest) = national.strip_prefix(area) {
            out.push(rest.to_string());
            out.push(format!("0{area}{rest}"));
        }
    }
    out
}

fn india(parts: &NumberParts<'_>) -> Vec<String> {
    let national = parts.national_number;
    if national.len() != 10 {
        return Vec::new();
    }
    vec![
        format!("0{national}"),
        format!("{} {}", &national[..4], &national[4..]),
    ]
}

fn generic(parts: &NumberParts<'_>) -> Vec<String> {
    let Some(parsed) = ParsedNumber::from_parts(parts.calling_code, parts.national_number) else {
        return Vec::new();
    };
    let without_parens = parsed.national().replace(['(', ')'], "");
    let compact: String = without_parens
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect();
    let international: String = parsed
        .international()
        .chars()
        .filter(|ch| !matches!(ch, '+' | ' ' | '-' | '(' | ')' | '.'))
        .collect();
    vec![without_parens, compact, international]
}
