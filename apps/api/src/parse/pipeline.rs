//! Resume chunk pipeline: extract → segment → chunk → flatten.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parse::chunker::chunk_section_text;
use crate::parse::extractor::{TextExtractor, BLOCK_SEPARATOR};
use crate::parse::sections::segment;
use crate::parse::ParseError;

/// One bounded slice of a resume section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeChunk {
    pub section: String,
    /// 1-based, restarts at 1 for every section.
    pub chunk_index: usize,
    pub text: String,
}

/// Extracts the resume at `path` and returns its sections as labeled chunks
/// of at most `max_words` words.
///
/// Extraction errors are returned as-is; deciding on a fallback is the
/// caller's job. The upload handler extracts once and calls
/// [`chunks_from_text`] itself so it can reuse the text as a fallback.
#[allow(dead_code)]
pub fn build_resume_chunks(
    extractor: &TextExtractor,
    path: &Path,
    max_words: NonZeroUsize,
) -> Result<Vec<ResumeChunk>, ParseError> {
    let text = extractor.extract(path)?;
    let chunks = chunks_from_text(&text, max_words);
    info!(
        path = %path.display(),
        chunks = chunks.len(),
        max_words = max_words.get(),
        "resume chunks built"
    );
    Ok(chunks)
}

/// Segments already-extracted text and chunks every non-empty section, in
/// section order. Text without any recognised heading yields no chunks.
pub fn chunks_from_text(text: &str, max_words: NonZeroUsize) -> Vec<ResumeChunk> {
    let sections = segment(text);
    let mut chunks = Vec::new();

    for (section, content) in sections.iter() {
        if content.is_empty() {
            continue;
        }
        let pieces = chunk_section_text(content, max_words);
        debug!(section, pieces = pieces.len(), "section chunked");
        chunks.extend(
            pieces
                .into_iter()
                .enumerate()
                .map(|(i, text)| ResumeChunk {
                    section: section.to_string(),
                    chunk_index: i + 1,
                    text,
                }),
        );
    }

    chunks
}

/// Flattens chunks back into a single resume text, one blank line between
/// chunks.
pub fn join_chunks(chunks: &[ResumeChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}
