//! Free-text category labels.

use serde::{Deserialize, Serialize};

/// Label reserved for income; excluded from spending breakdowns.
pub const INCOME_CATEGORY: &str = "Income";

pub const DEFAULT_CATEGORIES: [&str; 13] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Travel",
    "Education",
    "Business",
    INCOME_CATEGORY,
    "Housing",
    "Health & Fitness",
    "Other",
];

/// Ordered, duplicate-free set of category names.
///
/// There is no referential integrity with transactions or budgets: a label may be
/// used without being in the set, and removing a label leaves its users untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        Self(DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect())
    }

    /// Appends the trimmed name. Returns `false` for blanks and duplicates.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.trim();
        let before = self.0.len();
        self.0.retain(|existing| existing != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for CategorySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = CategorySet::new();
        for name in iter {
            set.insert(&name.into());
        }
        set
    }
}
