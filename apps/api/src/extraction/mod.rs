// CV extraction: decode upload → normalize text → match vocabularies.
// Decoding lives at the boundary; everything after it is pure and reentrant.

pub mod decoder;
pub mod extractor;
pub mod handlers;
pub mod normalizer;
pub mod vocabulary;

use crate::errors::EngineError;
use crate::extraction::extractor::{ExtractedTerms, TermExtractor};
use crate::extraction::normalizer::{normalize, NormalizedDocument};

/// Everything the engine derives from one uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSignals {
    pub document: NormalizedDocument,
    pub terms: ExtractedTerms,
}

/// Normalizes decoded text and extracts its skill and qualification terms.
pub fn process_document(
    raw_text: &str,
    extractor: &TermExtractor,
    preview_chars: usize,
) -> Result<DocumentSignals, EngineError> {
    let document = normalize(raw_text, preview_chars)?;
    let terms = extractor.extract(&document.text);
    Ok(DocumentSignals { document, terms })
}
