use bytes::Bytes;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use tracing::debug;

use crate::errors::AppError;

/// Document formats distinguished by the upload's declared file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Pre-2007 binary `.doc`; no decoder is bundled for it.
    LegacyWord,
    PlainText,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "doc" => DocumentFormat::LegacyWord,
            _ => DocumentFormat::PlainText,
        }
    }
}

/// Decodes uploaded bytes to text, selecting the decoder from the filename.
///
/// PDF and DOCX parsing runs on the blocking pool. Anything that is not a
/// PDF or Word document is read as UTF-8 with invalid sequences replaced.
pub async fn decode_document(filename: &str, bytes: Bytes) -> Result<String, AppError> {
    let format = DocumentFormat::from_filename(filename);
    debug!(filename, ?format, size = bytes.len(), "Decoding upload");

    match format {
        DocumentFormat::Pdf => {
            let text = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes)
            })
            .await
            // pdf-extract panics on some malformed files; treat that as unreadable.
            .map_err(|e| AppError::Decoding(format!("PDF decoder aborted: {e}")))?
            .map_err(|e| AppError::Decoding(format!("PDF extraction error: {e}")))?;
            Ok(text)
        }
        DocumentFormat::Docx => tokio::task::spawn_blocking(move || docx_text(&bytes))
            .await
            .map_err(|e| AppError::Decoding(format!("DOCX decoder aborted: {e}")))?,
        DocumentFormat::LegacyWord => Err(AppError::UnsupportedFormat(format!(
            "Legacy .doc files are not supported ({filename}); save as .docx or PDF"
        ))),
        DocumentFormat::PlainText => Ok(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Paragraph text of a DOCX body, one paragraph per line.
fn docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::Decoding(format!("DOCX parse error: {e}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run};
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&[&str]]) -> Bytes {
        let mut docx = Docx::new();
        for runs in paragraphs {
            let mut para = Paragraph::new();
            for run in *runs {
                para = para.add_run(Run::new().add_text(*run));
            }
            docx = docx.add_paragraph(para);
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        Bytes::from(buf.into_inner())
    }

    #[test]
    fn test_format_from_extension_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_filename("cv.PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("cv.DOCX"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_filename("cv.Doc"), DocumentFormat::LegacyWord);
        assert_eq!(DocumentFormat::from_filename("cv.txt"), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::from_filename("README"), DocumentFormat::PlainText);
    }

    #[tokio::test]
    async fn test_plain_text_replaces_invalid_utf8() {
        let bytes = Bytes::from_static(b"Python \xff SQL");
        let text = decode_document("cv.txt", bytes).await.unwrap();
        assert!(text.starts_with("Python "));
        assert!(text.ends_with(" SQL"));
    }

    #[tokio::test]
    async fn test_docx_paragraphs_become_lines() {
        let bytes = docx_bytes(&[&["Jane Doe"], &["Python ", "and SQL"], &["BSc Computing"]]);
        let text = decode_document("cv.docx", bytes).await.unwrap();
        assert_eq!(text, "Jane Doe\nPython and SQL\nBSc Computing");
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_decoding_error() {
        let result = decode_document("cv.docx", Bytes::from_static(b"PK")).await;
        assert!(matches!(result, Err(AppError::Decoding(_))));
    }

    #[tokio::test]
    async fn test_legacy_doc_is_rejected() {
        let result = decode_document("cv.doc", Bytes::from_static(b"\xd0\xcf\x11\xe0")).await;
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_decoding_error() {
        let result = decode_document("cv.pdf", Bytes::from_static(b"not a pdf")).await;
        assert!(matches!(result, Err(AppError::Decoding(_))));
    }
}
