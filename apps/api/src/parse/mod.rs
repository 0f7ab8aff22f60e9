// Resume parsing: document text + image OCR → heading sections → word chunks.
// Everything here is synchronous; callers on the async runtime wrap it in
// spawn_blocking.

use std::path::PathBuf;

use thiserror::Error;

pub mod chunker;
pub mod document;
pub mod extractor;
pub mod pipeline;
pub mod sections;

pub use extractor::TextExtractor;
pub use pipeline::{chunks_from_text, join_chunks};

/// Document-level failures. Unlike per-image OCR errors these abort the
/// whole extraction and are left to the caller to recover from.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("resume file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read resume: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open PDF: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for ParseError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => ParseError::Io(e),
            other => ParseError::Pdf(other.to_string()),
        }
    }
}
