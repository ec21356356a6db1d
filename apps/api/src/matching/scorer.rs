//! Match Scoring — ranks every posting in a corpus snapshot against a
//! candidate's extracted skills and qualifications.
//!
//! Default: `CoverageScorer` (pure, deterministic, no I/O).
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, built at startup from config.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::matching::corpus::JobCorpus;
use crate::models::job::JobPosting;
use crate::models::terms::TermSet;

/// Result size used when a request omits `top_n` or sends a non-positive one.
pub const DEFAULT_TOP_N: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / response models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub skills: TermSet,
    #[serde(default)]
    pub qualifications: TermSet,
    #[serde(default)]
    pub top_n: Option<i64>,
}

/// One scored posting. Serializes as the posting's own fields plus the scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub job: JobPosting,
    pub total_score: f64,
    pub skill_score: f64,
    pub qual_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchMetadata {
    pub total_jobs_loaded: usize,
    /// Postings with a positive total score across the whole corpus, before truncation.
    pub jobs_with_matches: usize,
    pub top_n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResponse {
    #[serde(rename = "jobs")]
    pub results: Vec<MatchResult>,
    pub metadata: MatchMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Weights
// ────────────────────────────────────────────────────────────────────────────

/// Relative weight of skill vs qualification coverage in the total score.
/// The total is the weighted mean, so it stays in [0, 1] for any valid pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skills: f64,
    pub qualifications: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            qualifications: 0.5,
        }
    }
}

impl ScoreWeights {
    pub fn new(skills: f64, qualifications: f64) -> Result<Self, EngineError> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(skills) || !valid(qualifications) || skills + qualifications <= 0.0 {
            return Err(EngineError::InvalidRequest(format!(
                "score weights must be non-negative with a positive sum (got {skills}, {qualifications})"
            )));
        }
        Ok(Self {
            skills,
            qualifications,
        })
    }

    pub fn combine(&self, skill_score: f64, qual_score: f64) -> f64 {
        let total = (self.skills * skill_score + self.qualifications * qual_score)
            / (self.skills + self.qualifications);
        total.clamp(0.0, 1.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap ranking backends without touching the handlers.
///
/// Implementations must not mutate the corpus and must be safe to call
/// concurrently.
pub trait MatchScorer: Send + Sync {
    fn rank(&self, request: &MatchRequest, corpus: &JobCorpus)
        -> Result<MatchResponse, EngineError>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// CoverageScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Scores each posting by how much of its stated requirements the candidate covers.
///
/// Algorithm:
/// 1. skill_score = |candidate ∩ required_skills| / |required_skills|, or 0 if none required
/// 2. qual_score  = same over qualifications
/// 3. total_score = weighted mean of the two (equal weights by default)
/// 4. Order: total desc, skill desc, corpus order. Zero-score postings stay
///    eligible so `top_n` larger than the match count still fills up.
pub struct CoverageScorer {
    weights: ScoreWeights,
    default_top_n: usize,
}

impl Default for CoverageScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default(), DEFAULT_TOP_N)
    }
}

impl CoverageScorer {
    pub fn new(weights: ScoreWeights, default_top_n: usize) -> Self {
        Self {
            weights,
            default_top_n: default_top_n.max(1),
        }
    }

    fn resolve_top_n(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => self.default_top_n,
        }
    }
}

struct JobScore {
    index: usize,
    skill: f64,
    qual: f64,
    total: f64,
}

impl MatchScorer for CoverageScorer {
    fn rank(
        &self,
        request: &MatchRequest,
        corpus: &JobCorpus,
    ) -> Result<MatchResponse, EngineError> {
        if request.skills.is_empty() && request.qualifications.is_empty() {
            return Err(EngineError::InvalidRequest(
                "at least one skill or qualification is required".to_string(),
            ));
        }

        let top_n = self.resolve_top_n(request.top_n);

        let mut scores: Vec<JobScore> = corpus
            .jobs()
            .iter()
            .enumerate()
            .map(|(index, job)| {
                let skill = coverage(&job.required_skills, &request.skills);
                let qual = coverage(&job.required_qualifications, &request.qualifications);
                JobScore {
                    index,
                    skill,
                    qual,
                    total: self.weights.combine(skill, qual),
                }
            })
            .collect();

        let jobs_with_matches = scores.iter().filter(|s| s.total > 0.0).count();

        scores.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| b.skill.total_cmp(&a.skill))
                .then_with(|| a.index.cmp(&b.index))
        });
        scores.truncate(top_n);

        let results = scores
            .into_iter()
            .map(|s| MatchResult {
                job: corpus.jobs()[s.index].clone(),
                total_score: s.total,
                skill_score: s.skill,
                qual_score: s.qual,
            })
            .collect();

        Ok(MatchResponse {
            results,
            metadata: MatchMetadata {
                total_jobs_loaded: corpus.len(),
                jobs_with_matches,
                top_n,
            },
        })
    }

    fn backend(&self) -> &'static str {
        "coverage"
    }
}

/// Fraction of `required` present in `candidate`. No requirements scores 0.
fn coverage(required: &TermSet, candidate: &TermSet) -> f64 {
    if required.is_empty() {
        return 0.0;
    }
    required.overlap(candidate) as f64 / required.len() as f64
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
