use std::sync::Arc;

use crate::config::Config;
use crate::extraction::extractor::TermExtractor;
use crate::matching::corpus::CorpusHandle;
use crate::matching::scorer::MatchScorer;
use crate::storage::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Compiled skill and qualification matchers, built once at startup.
    pub extractor: Arc<TermExtractor>,
    /// Active job corpus. Swapped as a whole on reload.
    pub corpus: CorpusHandle,
    /// Pluggable ranking backend. Default: CoverageScorer.
    pub scorer: Arc<dyn MatchScorer>,
    /// Where uploaded CVs are persisted: local disk or S3, per STORAGE_BACKEND.
    pub store: Arc<dyn DocumentStore>,
}
