use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::terms::TermSet;

/// A single job posting as loaded from the dataset. Immutable once loaded.
///
/// Dataset columns that carry no meaning for matching are preserved in `extra`
/// and flattened back out when the posting is serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub required_skills: TermSet,
    pub required_qualifications: TermSet,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
impl JobPosting {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: None,
            location: None,
            required_skills: TermSet::new(),
            required_qualifications: TermSet::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_skills = TermSet::from_terms(skills);
        self
    }

    pub fn with_qualifications<I, S>(mut self, qualifications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_qualifications = TermSet::from_terms(qualifications);
        self
    }
}
