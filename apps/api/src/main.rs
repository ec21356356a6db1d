mod config;
mod errors;
mod extraction;
mod matching;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageConfig};
use crate::extraction::extractor::TermExtractor;
use crate::extraction::vocabulary::{Vocabulary, DEFAULT_QUALIFICATIONS, DEFAULT_SKILLS};
use crate::matching::corpus::{CorpusHandle, JobCorpus};
use crate::matching::scorer::CoverageScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{build_s3_client, DocumentStore, LocalDocumentStore, S3DocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JustApply API v{}", env!("CARGO_PKG_VERSION"));

    // Compile vocabularies
    let skills = Vocabulary::load_or_builtin(
        "skills",
        config.skills_vocab_path.as_deref(),
        DEFAULT_SKILLS,
    )?;
    let qualifications = Vocabulary::load_or_builtin(
        "qualifications",
        config.qualifications_vocab_path.as_deref(),
        DEFAULT_QUALIFICATIONS,
    )?;
    let extractor = TermExtractor::new(skills, qualifications)?;
    info!(
        "Term extractor ready ({} skills, {} qualifications)",
        extractor.skill_vocabulary().len(),
        extractor.qualification_vocabulary().len()
    );

    // Load job corpus: no match can succeed without it, so failure is fatal
    let corpus = JobCorpus::load(&config.jobs_dataset_path).with_context(|| {
        format!(
            "Failed to load job corpus from {}",
            config.jobs_dataset_path.display()
        )
    })?;

    // Initialize upload storage
    let store: Arc<dyn DocumentStore> = match &config.storage {
        StorageConfig::Local { upload_dir } => Arc::new(LocalDocumentStore::new(upload_dir)),
        StorageConfig::S3(s3) => {
            let client = build_s3_client(s3).await;
            Arc::new(S3DocumentStore::new(client, &s3.bucket))
        }
    };
    info!("Upload storage backend: {}", store.backend());

    let scorer = Arc::new(CoverageScorer::new(
        config.score_weights,
        config.default_top_n,
    ));
    info!(
        "Scoring weights: skills={} qualifications={}, default top_n={}",
        config.score_weights.skills, config.score_weights.qualifications, config.default_top_n
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        extractor: Arc::new(extractor),
        corpus: CorpusHandle::new(corpus),
        scorer,
        store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the browser client calls cross-origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
