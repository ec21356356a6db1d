//! Upload storage. The engine never reads stored documents back; the store
//! only reports where the original file went so the client can show it.

use std::path::PathBuf;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::S3Settings;
use crate::errors::AppError;

/// Where an uploaded document was persisted. Exactly one locator is set,
/// depending on the active backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
}

/// Pluggable upload store. Carried in `AppState` as `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredDocument, AppError>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Local filesystem
// ────────────────────────────────────────────────────────────────────────────

/// Writes uploads to `<root>/<YYYYMMDDHHMMSS>-<uuid>-<name>`. Every upload gets
/// its own file, even for repeated names within the same second.
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredDocument, AppError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("cannot create {}: {e}", self.root.display())))?;

        let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let path = self.root.join(format!(
            "{timestamp}-{}-{}",
            Uuid::new_v4().simple(),
            sanitize_filename(filename)
        ));

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("cannot write {}: {e}", path.display())))?;

        info!("Stored upload at {}", path.display());
        Ok(StoredDocument {
            local_path: Some(path.display().to_string()),
            blob_url: None,
        })
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

pub struct S3DocumentStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3DocumentStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredDocument, AppError> {
        let key = format!("uploads/{}-{}", Uuid::new_v4(), sanitize_filename(filename));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type(content_type_for(filename))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Stored upload at s3://{}/{}", self.bucket, key);
        Ok(StoredDocument {
            local_path: None,
            blob_url: Some(format!("s3://{}/{}", self.bucket, key)),
        })
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(settings: &S3Settings) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &settings.access_key_id,
        &settings.secret_access_key,
        None,
        None,
        "justapply-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&settings.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

/// Keeps only the final path component and replaces anything outside
/// `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "pdf" => "application/pdf",
        Some(ext) if ext == "txt" => "text/plain",
        Some(ext) if ext == "docx" => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}
