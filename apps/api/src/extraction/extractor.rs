//! Vocabulary term extraction.
//!
//! Each vocabulary is compiled once into an Aho-Corasick automaton over its
//! lower-cased terms. Scanning reports every (overlapping) occurrence; an
//! occurrence only counts when it is bounded by non-alphanumeric characters or
//! the text edges, so "go" never matches inside "going" or "golang".
//!
//! Extracted sets follow vocabulary order, not document order, so the result
//! depends only on which terms occur and never on layout.

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Serialize;

use crate::errors::EngineError;
use crate::extraction::vocabulary::Vocabulary;
use crate::models::terms::TermSet;

/// Precompiled whole-term matcher over a single vocabulary.
pub struct TermMatcher {
    automaton: AhoCorasick,
    vocabulary: Vocabulary,
}

impl TermMatcher {
    pub fn new(vocabulary: Vocabulary) -> Result<Self, EngineError> {
        let patterns: Vec<String> = vocabulary
            .terms()
            .iter()
            .map(|t| t.to_lowercase())
            .collect();

        // Standard semantics are required for overlapping search: "bachelor"
        // and "bachelor of science" must both be reported.
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| {
                EngineError::Vocabulary(format!(
                    "failed to compile {} matcher: {e}",
                    vocabulary.name()
                ))
            })?;

        Ok(Self {
            automaton,
            vocabulary,
        })
    }

    /// Returns the vocabulary terms that occur in `text` as whole terms.
    pub fn find(&self, text: &str) -> TermSet {
        let haystack = text.to_lowercase();
        let mut seen = vec![false; self.vocabulary.len()];

        for m in self.automaton.find_overlapping_iter(&haystack) {
            if is_whole_term(&haystack, m.start(), m.end()) {
                seen[m.pattern().as_usize()] = true;
            }
        }

        TermSet::from_terms(
            self.vocabulary
                .terms()
                .iter()
                .zip(seen)
                .filter_map(|(term, hit)| hit.then_some(term)),
        )
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

fn is_whole_term(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    let after = text.get(end..).and_then(|s| s.chars().next());
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Skills and qualifications recognised in a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTerms {
    pub skills: TermSet,
    pub qualifications: TermSet,
}

/// Runs the skill and qualification matchers over normalized text.
pub struct TermExtractor {
    skills: TermMatcher,
    qualifications: TermMatcher,
}

impl TermExtractor {
    pub fn new(skills: Vocabulary, qualifications: Vocabulary) -> Result<Self, EngineError> {
        Ok(Self {
            skills: TermMatcher::new(skills)?,
            qualifications: TermMatcher::new(qualifications)?,
        })
    }

    pub fn extract(&self, text: &str) -> ExtractedTerms {
        ExtractedTerms {
            skills: self.skills.find(text),
            qualifications: self.qualifications.find(text),
        }
    }

    pub fn skill_vocabulary(&self) -> &Vocabulary {
        self.skills.vocabulary()
    }

    pub fn qualification_vocabulary(&self) -> &Vocabulary {
        self.qualifications.vocabulary()
    }
}
