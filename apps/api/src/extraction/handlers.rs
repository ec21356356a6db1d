//! Axum route handlers for the Upload API.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extraction::decoder::decode_document;
use crate::extraction::process_document;
use crate::models::terms::TermSet;
use crate::state::AppState;
use crate::storage::StoredDocument;

/// Multipart field carrying the CV, as sent by the upload client.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub original_name: String,
    #[serde(flatten)]
    pub stored: StoredDocument,
    pub skills: TermSet,
    pub qualifications: TermSet,
    pub text_preview: String,
}

/// POST /api/upload-cv
///
/// Accepts a multipart CV upload, extracts skills, qualifications and a text
/// preview, and stores the original file. Nothing is stored when the document
/// cannot be decoded or has no text.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut multipart = multipart?;
    let (filename, data) = read_file_field(&mut multipart).await?;
    let size = data.len();

    let raw_text = decode_document(&filename, data.clone()).await?;
    let signals = process_document(&raw_text, &state.extractor, state.config.preview_chars)?;
    let stored = state.store.store(&filename, &data).await?;

    debug!(
        skills = ?signals.terms.skills.as_slice(),
        qualifications = ?signals.terms.qualifications.as_slice(),
        "Extracted terms"
    );

    info!(
        filename = %filename,
        size,
        skills = signals.terms.skills.len(),
        qualifications = signals.terms.qualifications.len(),
        store = state.store.backend(),
        "CV uploaded and parsed"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "CV uploaded & parsed successfully".to_string(),
            original_name: filename,
            stored,
            skills: signals.terms.skills,
            qualifications: signals.terms.qualifications,
            text_preview: signals.document.preview,
        }),
    ))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(AppError::Validation("Empty filename".to_string()));
        }
        let data = field.bytes().await?;
        return Ok((filename, data));
    }
    Err(AppError::Validation("No file provided".to_string()))
}
