//! Axum route handlers for the Analysis API.

use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::analysis::{format_analysis, AnalysisRequest, ResumeAnalysis};
use crate::errors::AppError;
use crate::parse::{chunks_from_text, join_chunks, ParseError, TextExtractor};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: ResumeAnalysis,
    pub summary: String,
}

/// Multipart fields of an analyze request.
struct ResumeUpload {
    job_description: String,
    file_name: Option<String>,
    file: Bytes,
}

/// POST /analyze-resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let request_id = Uuid::new_v4();
    analyze_upload(state, multipart)
        .instrument(info_span!("analyze_resume", %request_id))
        .await
}

async fn analyze_upload(
    state: AppState,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        file_name = upload.file_name.as_deref().unwrap_or("unnamed"),
        bytes = upload.file.len(),
        "resume received"
    );

    let extractor = state.extractor.clone();
    let max_words = state.config.max_chunk_words;
    let span = Span::current();
    let file = upload.file;
    let resume_text = tokio::task::spawn_blocking(move || {
        span.in_scope(|| extract_upload(&extractor, &file, max_words))
    })
    .await
    .context("resume extraction task failed")??;

    let request = AnalysisRequest {
        resume_text,
        job_description: upload.job_description,
    };
    let analysis = state.analyzer.analyze(&request).await?;
    let summary = format_analysis(&analysis);

    Ok(Json(AnalyzeResponse { analysis, summary }))
}

async fn read_upload(multipart: &mut Multipart) -> Result<ResumeUpload, AppError> {
    let mut job_description = None;
    let mut file = None;
    let mut file_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read job_description: {e}")))?;
                job_description = Some(text);
            }
            "file" => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file = Some(bytes);
            }
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let file = file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    if file.is_empty() {
        return Err(AppError::Validation("file cannot be empty".to_string()));
    }

    Ok(ResumeUpload {
        job_description,
        file_name,
        file,
    })
}

/// Spools the upload to a temp file (removed on drop) and extracts it.
fn extract_upload(
    extractor: &TextExtractor,
    bytes: &[u8],
    max_words: NonZeroUsize,
) -> Result<String, AppError> {
    let mut spool = NamedTempFile::new().context("failed to create upload file")?;
    spool
        .write_all(bytes)
        .context("failed to write upload file")?;
    Ok(resume_text(extractor, spool.path(), max_words)?)
}

/// Chunked resume text, or the raw extraction when no sections are found.
/// The document is extracted once; OCR is not repeated for the fallback.
fn resume_text(
    extractor: &TextExtractor,
    path: &Path,
    max_words: NonZeroUsize,
) -> Result<String, ParseError> {
    let text = extractor.extract(path)?;
    let chunks = chunks_from_text(&text, max_words);
    if chunks.is_empty() {
        warn!("no resume sections found; using raw text");
        return Ok(text);
    }
    info!(
        chunks = chunks.len(),
        max_words = max_words.get(),
        "resume chunks built"
    );
    Ok(join_chunks(&chunks))
}
