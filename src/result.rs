//! Ordered, deduplicating set of strings returned by every query.

use std::collections::HashSet;
use std::fmt;

/// Insertion-ordered string set. Equality is set equality; iteration
/// order is first-seen order and deterministic for identical inputs.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value; a value already present is a no-op.
    pub fn add(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !self.seen.contains(&value) {
            self.seen.insert(value.clone());
            self.items.push(value);
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Adds every member of `other` not already present.
    pub fn union(&mut self, other: ResultSet) {
        for value in other.items {
            self.add(value);
        }
    }

    /// Keeps only members also present in `other`.
    pub fn intersect(&mut self, other: &ResultSet) {
        self.retain(|v| other.contains(v));
    }

    /// Removes every member present in `other`.
    pub fn subtract(&mut self, other: &ResultSet) {
        self.retain(|v| !other.contains(v));
    }

    /// True when the two sets share at least one member.
    pub fn overlaps(&self, other: &ResultSet) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.iter().any(|v| large.contains(v))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let seen = &mut self.seen;
        self.items.retain(|v| {
            let kept = keep(v.as_str());
            if !kept {
                seen.remove(v);
            }
            kept
        });
    }

    /// Members sorted lexicographically, for display.
    pub fn sorted(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.iter().collect();
        out.sort_unstable();
        out
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for ResultSet {}

impl<S: Into<String>> FromIterator<S> for ResultSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for ResultSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl IntoIterator for ResultSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items.join(","))
    }
}
