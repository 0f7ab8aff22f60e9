use std::sync::Arc;

use crate::analysis::ResumeAnalyzer;
use crate::config::Config;
use crate::parse::TextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Carries the OCR engine chosen at startup.
    pub extractor: Arc<TextExtractor>,
    /// Pluggable analyzer. Default: `LlmResumeAnalyzer` over OpenRouter.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}
