use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Ordered, case-insensitively deduplicated set of skill or qualification terms.
///
/// Each term keeps its first-seen spelling (trimmed, inner whitespace collapsed).
/// Membership is decided on the lower-cased form, so "Python" and "python"
/// are the same term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TermSet {
    terms: Vec<String>,
    keys: HashSet<String>,
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw terms, dropping blanks and duplicates.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for term in terms {
            set.insert(term.as_ref());
        }
        set
    }

    /// Inserts a term. Returns false when it is blank or already present.
    pub fn insert(&mut self, term: &str) -> bool {
        let canonical = canonical_term(term);
        if canonical.is_empty() {
            return false;
        }
        if !self.keys.insert(canonical.to_lowercase()) {
            return false;
        }
        self.terms.push(canonical);
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        self.keys.contains(&term_key(term))
    }

    /// Number of this set's terms that also appear in `other`.
    pub fn overlap(&self, other: &TermSet) -> usize {
        self.terms.iter().filter(|t| other.contains(t)).count()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.terms
    }
}

impl From<Vec<String>> for TermSet {
    fn from(terms: Vec<String>) -> Self {
        Self::from_terms(terms)
    }
}

impl From<TermSet> for Vec<String> {
    fn from(set: TermSet) -> Self {
        set.terms
    }
}

/// Trims and collapses inner whitespace runs to a single space.
pub fn canonical_term(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key: canonical form, lower-cased.
pub fn term_key(term: &str) -> String {
    canonical_term(term).to_lowercase()
}
