pub mod country;
pub mod matching;
pub mod variations;

pub use country::{apply_country_heuristics, heuristic_for, CountryHeuristic, NumberParts};
pub use matching::{dedup_contacts, match_contacts, ContactMatch, PhoneToContactMap};
pub use variations::generate_variations;
