use serde::Serialize;
use std::collections::btree_set;
use std::collections::BTreeSet;

/// The strings a CRM record might plausibly store one raw phone as.
///
/// Membership is exact: `"01234"` and `"1234"` are different variations.
/// Blank strings are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariationSet(BTreeSet<String>);

impl VariationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.trim().is_empty() {
            return false;
        }
        self.0.insert(value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    pub fn intersection<'a>(&'a self, other: &'a VariationSet) -> impl Iterator<Item = &'a String> {
        self.0.intersection(&other.0)
    }
}

impl Extend<String> for VariationSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a> IntoIterator for &'a VariationSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for VariationSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::VariationSet;

    #[test]
    fn insert_collapses_duplicates_and_skips_blank() {
        let mut set = VariationSet::new();
        assert!(set.insert("+14155552671"));
        assert!(!set.insert("+14155552671"));
        assert!(!set.insert("  "));
        set.insert("01234");
        set.insert("1234");
        assert_eq!(set.len(), 3);
        assert!(set.contains("01234"));
        assert!(set.contains("1234"));
    }
}
