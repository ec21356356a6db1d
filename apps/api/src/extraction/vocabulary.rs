use std::path::Path;

use crate::errors::EngineError;
use crate::models::terms::TermSet;

pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "c#",
    "c++",
    "react",
    "next.js",
    "html",
    "css",
    "django",
    "flask",
    "node.js",
    "sql",
    "mysql",
    "postgresql",
    "azure",
    "aws",
    "docker",
    "git",
    "linux",
    "power bi",
    "nlp",
    "natural language processing",
    "machine learning",
    "data analysis",
];

pub const DEFAULT_QUALIFICATIONS: &[&str] = &[
    "bsc",
    "b.sc",
    "bachelor",
    "bachelors",
    "ba",
    "b.a",
    "msc",
    "m.sc",
    "master",
    "masters",
    "ma",
    "m.a",
    "phd",
    "doctorate",
    "bachelor of science",
    "bachelor of engineering",
    "bachelor of arts",
    "master of science",
    "master of engineering",
    "master of arts",
    "honours",
    "hons",
    "higher diploma",
    "postgraduate diploma",
    "aws certified",
    "azure certification",
    "oracle certified",
    "microsoft certified",
    "ccna",
    "comptia",
];

/// Ordered list of canonical terms recognised by the extractor.
/// Order is significant: extracted term sets follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    name: String,
    terms: Vec<String>,
}

impl Vocabulary {
    /// Builds a vocabulary, dropping blanks and case-insensitive duplicates.
    pub fn new<I, S>(name: &str, terms: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = TermSet::from_terms(terms).into();
        if terms.is_empty() {
            return Err(EngineError::Vocabulary(format!(
                "{name} vocabulary has no terms"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            terms,
        })
    }

    /// Reads one term per line. Blank lines and `#` comments are ignored.
    pub fn from_file(name: &str, path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Vocabulary(format!(
                "cannot read {name} vocabulary at {}: {e}",
                path.display()
            ))
        })?;
        Self::new(
            name,
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )
    }

    /// Loads from `path` when configured, otherwise falls back to `builtin`.
    pub fn load_or_builtin(
        name: &str,
        path: Option<&Path>,
        builtin: &[&str],
    ) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::from_file(name, path),
            None => Self::new(name, builtin),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}
