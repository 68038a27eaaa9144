/// Strips every non-digit character. Returns `None` when nothing numeric is left,
/// so blank or purely decorative values never compare equal to each other.
pub fn digits_only(value: &str) -> Option<String> {
    let out: String = value.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if out.is_empty() {
        return None;
    }
    Some(out)
}
