//! Axum route handlers for the Match and Corpus APIs.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{AppError, EngineError};
use crate::matching::corpus::{JobCorpus, LoadReport};
use crate::matching::scorer::{MatchRequest, MatchResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CorpusStatusResponse {
    pub total_jobs_loaded: usize,
    pub skipped_rows: usize,
    pub load_report: LoadReport,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

impl From<&JobCorpus> for CorpusStatusResponse {
    fn from(corpus: &JobCorpus) -> Self {
        Self {
            total_jobs_loaded: corpus.len(),
            skipped_rows: corpus.report().skipped(),
            load_report: corpus.report().clone(),
            source: corpus.source().to_string(),
            loaded_at: corpus.loaded_at(),
        }
    }
}

/// POST /api/match-jobs
///
/// Ranks the active corpus against the submitted skills and qualifications.
/// The caller resends the terms returned by the upload endpoint.
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let Json(request) = payload?;
    let corpus = state.corpus.snapshot().await;
    let response = state.scorer.rank(&request, &corpus)?;

    info!(
        skills = request.skills.len(),
        qualifications = request.qualifications.len(),
        top_n = response.metadata.top_n,
        jobs_with_matches = response.metadata.jobs_with_matches,
        scorer = state.scorer.backend(),
        "Matched candidate against {} jobs",
        response.metadata.total_jobs_loaded
    );

    Ok(Json(response))
}

/// GET /api/corpus
pub async fn handle_corpus_status(State(state): State<AppState>) -> Json<CorpusStatusResponse> {
    let corpus = state.corpus.snapshot().await;
    Json(CorpusStatusResponse::from(corpus.as_ref()))
}

/// POST /api/corpus/reload
///
/// Rebuilds the corpus from the configured dataset and swaps it in.
/// On failure the current corpus stays active.
pub async fn handle_corpus_reload(
    State(state): State<AppState>,
) -> Result<Json<CorpusStatusResponse>, AppError> {
    let path = state.config.jobs_dataset_path.clone();
    let loaded = tokio::task::spawn_blocking(move || JobCorpus::load(&path))
        .await
        .map_err(|e| EngineError::CorpusLoad(format!("reload task failed: {e}")))?;

    let corpus = match loaded {
        Ok(corpus) => corpus,
        Err(e) => {
            warn!("Corpus reload failed, keeping current corpus: {e}");
            return Err(e.into());
        }
    };

    let status = CorpusStatusResponse::from(&corpus);
    let previous = state.corpus.replace(corpus).await;
    info!(
        previous = previous.len(),
        current = status.total_jobs_loaded,
        "Job corpus reloaded"
    );

    Ok(Json(status))
}
