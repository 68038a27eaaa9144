use phonenumber::{Mode, PhoneNumber};

/// A phone number split according to its numbering plan.
///
/// The national number keeps its leading zeros (`"0612345678"` stays as is) so
/// heuristics can reason about trunk prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNumber {
    calling_code: String,
    national_number: String,
    country: Option<String>,
    e164: String,
    international: String,
    national: String,
}

impl ParsedNumber {
    /// Parses an international-form string (`+<cc><national>`). Malformed input
    /// yields `None`; this never panics on user data.
    pub fn parse(value: &str) -> Option<Self> {
        let parsed: PhoneNumber = phonenumber::parse(None, value).ok()?;
        let national = parsed.national();
        let national_number = format!(
            "{}{}",
            "0".repeat(usize::from(national.zeros())),
            national.value()
        );
        let country = parsed.country().id().map(|id| format!("{:?}", id));

        Some(Self {
            calling_code: parsed.country().code().to_string(),
            national_number,
            country,
            e164: parsed.format().mode(Mode::E164).to_string(),
            international: parsed.format().mode(Mode::International).to_string(),
            national: parsed.format().mode(Mode::National).to_string(),
        })
    }

    /// Builds a number from its parts, e.g. after a heuristic rewrote the national number.
    pub fn from_parts(calling_code: &str, national_number: &str) -> Option<Self> {
        Self::parse(&format!("+{calling_code}{national_number}"))
    }

    pub fn calling_code(&self) -> &str {
        &self.calling_code
    }

    pub fn national_number(&self) -> &str {
        &self.national_number
    }

    /// ISO 3166-1 alpha-2 region, when the numbering plan can attribute one.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Region used to pick country heuristics. Falls back to the calling code for
    /// codes owned by a single supported country, since legacy numbers (a Brazilian
    /// mobile without its ninth digit, say) are often not attributable to a region.
    pub fn dispatch_country(&self) -> Option<&str> {
        self.country()
            .or_else(|| country_for_calling_code(&self.calling_code))
    }

    pub fn e164(&self) -> &str {
        &self.e164
    }

    pub fn international(&self) -> &str {
        &self.international
    }

    pub fn national(&self) -> &str {
        &self.national
    }
}

const SINGLE_COUNTRY_CODES: &[(&str, &str)] = &[
    ("55", "BR"),
    ("52", "MX"),
    ("54", "AR"),
    ("57", "CO"),
    ("58", "VE"),
    ("225", "CI"),
    ("62", "ID"),
    ("91", "IN"),
];

pub fn country_for_calling_code(calling_code: &str) -> Option<&'static str> {
    SINGLE_COUNTRY_CODES
        .iter()
        .find(|(code, _)| *code == calling_code)
        .map(|(_, country)| *country)
}

#[cfg(test)]
mod tests {
    use super::{country_for_calling_code, ParsedNumber};

    #[test]
    fn parse_splits_us_number() {
        let parsed = ParsedNumber::parse("+14155552671").expect("parse");
        assert_eq!(parsed.calling_code(), "1");
        assert_eq!(parsed.national_number(), "4155552671");
        assert_eq!(parsed.country(), Some("US"));
        assert_eq!(parsed.e164(), "+14155552671");
    }

    #[test]
    fn parse_rejects_text() {
        assert!(ParsedNumber::parse("+abc").is_none());
        assert!(ParsedNumber::parse("").is_none());
    }

    #[test]
    fn from_parts_round_trips_through_e164() {
        let parsed = ParsedNumber::from_parts("55", "11987654321").expect("parse");
        assert_eq!(parsed.e164(), "+5511987654321");
        assert_eq!(parsed.national_number(), "11987654321");
    }

    #[test]
    fn dispatch_country_falls_back_to_calling_code() {
        assert_eq!(country_for_calling_code("55"), Some("BR"));
        assert_eq!(country_for_calling_code("1"), None);
        let parsed = ParsedNumber::from_parts("55", "1187654321").expect("parse");
        assert_eq!(parsed.dispatch_country(), Some("BR"));
    }
}
