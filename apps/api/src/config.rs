use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

const DEFAULT_PRIMARY_MODEL: &str = "google/gemini-flash-1.5";
const DEFAULT_FALLBACK_MODEL: &str = "z-ai/glm-4.5-air:free";
const DEFAULT_MAX_CHUNK_WORDS: usize = 500;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub llm_base_url: String,
    pub primary_model: String,
    /// `None` when `LLM_FALLBACK_MODEL` is set to an empty string.
    pub fallback_model: Option<String>,
    pub tesseract_cmd: PathBuf,
    pub ocr_lang: String,
    pub max_chunk_words: NonZeroUsize,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let max_chunk_words = match var("MAX_CHUNK_WORDS") {
            Some(raw) => raw
                .parse::<NonZeroUsize>()
                .context("MAX_CHUNK_WORDS must be a positive integer")?,
            None => NonZeroUsize::new(DEFAULT_MAX_CHUNK_WORDS)
                .context("default chunk size must be positive")?,
        };

        let fallback_model = or_default("LLM_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL);

        Ok(Config {
            openrouter_api_key: var("OPENROUTER_API_KEY").with_context(|| {
                "Required environment variable 'OPENROUTER_API_KEY' is not set".to_string()
            })?,
            llm_base_url: or_default("LLM_BASE_URL", DEFAULT_BASE_URL),
            primary_model: or_default("LLM_PRIMARY_MODEL", DEFAULT_PRIMARY_MODEL),
            fallback_model: Some(fallback_model.trim().to_string()).filter(|m| !m.is_empty()),
            tesseract_cmd: PathBuf::from(or_default("TESSERACT_CMD", "tesseract")),
            ocr_lang: or_default("OCR_LANG", "eng"),
            max_chunk_words,
            max_upload_bytes: or_default("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: or_default("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }

    /// Models to try for analysis, primary first.
    pub fn analysis_models(&self) -> Vec<String> {
        std::iter::once(self.primary_model.clone())
            .chain(self.fallback_model.clone())
            .collect()
    }
}
