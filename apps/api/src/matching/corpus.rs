//! Job corpus: loaded once from a tabular dataset, shared read-only across
//! requests, and replaced wholesale on reload.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::models::job::JobPosting;
use crate::models::terms::TermSet;

/// Columns that would collide with the score fields of a match result.
const RESERVED_COLUMNS: &[&str] = &["total_score", "skill_score", "qual_score"];

/// Counts gathered while turning dataset rows into postings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_missing_title: usize,
    pub skipped_duplicate_id: usize,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.skipped_missing_title + self.skipped_duplicate_id
    }
}

/// Immutable, ordered collection of postings with unique ids.
#[derive(Debug, Clone)]
pub struct JobCorpus {
    jobs: Vec<JobPosting>,
    report: LoadReport,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl JobCorpus {
    /// Reads a `.csv` or `.json` dataset.
    ///
    /// Rows without a title, or repeating an earlier id, are skipped and
    /// counted. An unreadable file or zero surviving rows is an error.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let rows = match ext.as_str() {
            "csv" => read_csv_rows(path)?,
            "json" => read_json_rows(path)?,
            other => {
                return Err(EngineError::CorpusLoad(format!(
                    "unsupported dataset format '{other}' for {} (expected .csv or .json)",
                    path.display()
                )))
            }
        };
        debug!(rows = rows.len(), path = %path.display(), "Read dataset rows");

        let (jobs, report) = build_postings(rows);
        let corpus = Self::new(jobs, report, path.display().to_string())?;

        info!(
            loaded = corpus.report.loaded,
            skipped_missing_title = corpus.report.skipped_missing_title,
            skipped_duplicate_id = corpus.report.skipped_duplicate_id,
            "Loaded job corpus from {}",
            corpus.source
        );
        Ok(corpus)
    }

    /// Builds a corpus from postings already in memory.
    #[cfg(test)]
    pub fn from_postings(jobs: Vec<JobPosting>, source: &str) -> Result<Self, EngineError> {
        {
            let mut seen = HashSet::new();
            if let Some(dup) = jobs.iter().find(|j| !seen.insert(j.id.as_str())) {
                return Err(EngineError::CorpusLoad(format!("duplicate job id '{}'", dup.id)));
            }
        }
        let report = LoadReport {
            loaded: jobs.len(),
            ..LoadReport::default()
        };
        Self::new(jobs, report, source.to_string())
    }

    fn new(jobs: Vec<JobPosting>, report: LoadReport, source: String) -> Result<Self, EngineError> {
        if jobs.is_empty() {
            return Err(EngineError::CorpusLoad(format!(
                "{source} contains no usable job rows"
            )));
        }
        Ok(Self {
            jobs,
            report,
            source,
            loaded_at: Utc::now(),
        })
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared handle
// ────────────────────────────────────────────────────────────────────────────

/// Cloneable handle to the active corpus.
///
/// Readers take an `Arc` snapshot and keep using it for the whole request;
/// `replace` swaps in a fully built corpus, so a reader sees either the old
/// or the new one, never a mix.
#[derive(Clone)]
pub struct CorpusHandle {
    active: Arc<RwLock<Arc<JobCorpus>>>,
}

impl CorpusHandle {
    pub fn new(corpus: JobCorpus) -> Self {
        Self {
            active: Arc::new(RwLock::new(Arc::new(corpus))),
        }
    }

    pub async fn snapshot(&self) -> Arc<JobCorpus> {
        self.active.read().await.clone()
    }

    /// Installs `corpus` and returns the one it replaced.
    pub async fn replace(&self, corpus: JobCorpus) -> Arc<JobCorpus> {
        let mut active = self.active.write().await;
        std::mem::replace(&mut *active, Arc::new(corpus))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dataset parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// One dataset row: column name and value, in source order.
type DatasetRow = Vec<(String, FieldValue)>;

fn read_csv_rows(path: &Path) -> Result<Vec<DatasetRow>, EngineError> {
    let csv_err =
        |e: csv::Error| EngineError::CorpusLoad(format!("cannot read {}: {e}", path.display()));

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), FieldValue::Text(v.to_string())))
                .collect(),
        );
    }
    Ok(rows)
}

fn read_json_rows(path: &Path) -> Result<Vec<DatasetRow>, EngineError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| EngineError::CorpusLoad(format!("cannot read {}: {e}", path.display())))?;
    let objects: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&content)
        .map_err(|e| {
            EngineError::CorpusLoad(format!(
                "{} is not a JSON array of objects: {e}",
                path.display()
            ))
        })?;

    Ok(objects
        .into_iter()
        .map(|object| {
            object
                .into_iter()
                .filter_map(|(key, value)| json_field(value).map(|v| (key, v)))
                .collect()
        })
        .collect())
}

fn json_field(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(FieldValue::Text(s)),
        Value::Array(items) => Some(FieldValue::List(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect(),
        )),
        other => Some(FieldValue::Text(other.to_string())),
    }
}

fn build_postings(rows: Vec<DatasetRow>) -> (Vec<JobPosting>, LoadReport) {
    let mut report = LoadReport::default();
    let mut candidates = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + 1;
        let mut id = None;
        let mut title = None;
        let mut company = None;
        let mut location = None;
        let mut skills = TermSet::new();
        let mut qualifications = TermSet::new();
        let mut extra = BTreeMap::new();

        for (column, value) in row {
            match column.trim().to_ascii_lowercase().as_str() {
                "id" | "job_id" => id = non_blank(value),
                "title" | "job_title" => title = non_blank(value),
                "company" => company = non_blank(value),
                "location" => location = non_blank(value),
                "skills" | "required_skills" => skills = term_set(value),
                "qualifications" | "required_qualifications" => qualifications = term_set(value),
                key if RESERVED_COLUMNS.contains(&key) => {}
                _ => {
                    if let Some(text) = non_blank(value) {
                        extra.insert(column.trim().to_string(), text);
                    }
                }
            }
        }

        let Some(title) = title else {
            debug!(row = row_number, "Skipping dataset row without a title");
            report.skipped_missing_title += 1;
            continue;
        };

        candidates.push((
            row_number,
            id,
            JobPosting {
                id: String::new(),
                title,
                company,
                location,
                required_skills: skills,
                required_qualifications: qualifications,
                extra,
            },
        ));
    }

    // Declared ids win over generated ones, wherever they appear in the file.
    let declared: HashSet<String> = candidates
        .iter()
        .filter_map(|(_, id, _)| id.clone())
        .collect();
    let mut seen_ids = HashSet::new();
    let mut jobs = Vec::with_capacity(candidates.len());

    for (row_number, id, mut job) in candidates {
        let id = id.unwrap_or_else(|| generated_id(row_number, &declared, &seen_ids));
        if !seen_ids.insert(id.clone()) {
            debug!(row = row_number, id = %id, "Skipping dataset row with duplicate id");
            report.skipped_duplicate_id += 1;
            continue;
        }
        job.id = id;
        jobs.push(job);
    }

    report.loaded = jobs.len();
    (jobs, report)
}

/// `job-<row>`, suffixed until it clashes with neither a declared nor an
/// already assigned id.
fn generated_id(row_number: usize, declared: &HashSet<String>, seen: &HashSet<String>) -> String {
    let base = format!("job-{row_number}");
    let mut candidate = base.clone();
    let mut suffix = 2;
    while declared.contains(&candidate) || seen.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    candidate
}

fn non_blank(value: FieldValue) -> Option<String> {
    let text = match value {
        FieldValue::Text(s) => s,
        FieldValue::List(items) => items.join(", "),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Requirement cells hold terms separated by `,`, `;` or `|`.
fn term_set(value: FieldValue) -> TermSet {
    match value {
        FieldValue::Text(s) => TermSet::from_terms(s.split(|c: char| matches!(c, ',' | ';' | '|'))),
        FieldValue::List(items) => TermSet::from_terms(items),
    }
}
