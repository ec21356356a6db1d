use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::extraction::normalizer::DEFAULT_PREVIEW_CHARS;
use crate::matching::scorer::{ScoreWeights, DEFAULT_TOP_N};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub jobs_dataset_path: PathBuf,
    pub skills_vocab_path: Option<PathBuf>,
    pub qualifications_vocab_path: Option<PathBuf>,
    pub preview_chars: usize,
    pub default_top_n: usize,
    pub score_weights: ScoreWeights,
    pub max_upload_bytes: usize,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { upload_dir: PathBuf },
    S3(S3Settings),
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let storage = match env.get("STORAGE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StorageConfig::Local {
                upload_dir: PathBuf::from(env.get("UPLOAD_DIR").unwrap_or_else(|| "uploads".into())),
            },
            "s3" => StorageConfig::S3(S3Settings {
                bucket: env.require("S3_BUCKET")?,
                endpoint: env.require("S3_ENDPOINT")?,
                region: env.get("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
                access_key_id: env.require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: env.require("AWS_SECRET_ACCESS_KEY")?,
            }),
            other => bail!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let skill_weight = env.parse_or("SKILL_WEIGHT", 0.5_f64)?;
        let qual_weight = env.parse_or("QUAL_WEIGHT", 0.5_f64)?;
        let score_weights = ScoreWeights::new(skill_weight, qual_weight)
            .context("SKILL_WEIGHT / QUAL_WEIGHT are invalid")?;

        let default_top_n = env.parse_or("DEFAULT_TOP_N", DEFAULT_TOP_N)?;
        if default_top_n == 0 {
            bail!("DEFAULT_TOP_N must be greater than zero");
        }

        Ok(Config {
            port: env.parse_or("PORT", 5000_u16)?,
            rust_log: env.get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            jobs_dataset_path: PathBuf::from(env.require("JOBS_DATASET_PATH")?),
            skills_vocab_path: env.get("SKILLS_VOCAB_PATH").map(PathBuf::from),
            qualifications_vocab_path: env.get("QUALIFICATIONS_VOCAB_PATH").map(PathBuf::from),
            preview_chars: env.parse_or("PREVIEW_CHARS", DEFAULT_PREVIEW_CHARS)?,
            default_top_n,
            score_weights,
            max_upload_bytes: env.parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            storage,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value '{raw}'")),
            None => Ok(default),
        }
    }
}
