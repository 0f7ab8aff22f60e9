//! Resume Analysis — scores a resume against a job description.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`; the production backend is
//! `LlmResumeAnalyzer`, which asks a chat model for a `ResumeAnalysis` JSON
//! document.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;

pub mod analyzer;
pub mod format;
pub mod handlers;
pub mod prompts;

pub use analyzer::LlmResumeAnalyzer;
pub use format::format_analysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Structured fit report for one resume / job description pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// 0 – 100
    pub overall_fit_score: f64,
    pub missing_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub experience_gap: String,
    pub improvement_suggestions: Vec<String>,
    /// Resume section → rewritten bullets, in the order the model gave them.
    pub suggested_bullet_points: IndexMap<String, Vec<String>>,
    pub ats_optimization: Vec<String>,
    pub confidence_score: Confidence,
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No resume text provided for analysis.")]
    EmptyResume,

    #[error("No job description provided for analysis.")]
    EmptyJobDescription,

    #[error("No language model is configured for analysis.")]
    NoModelAvailable,

    #[error("Model {model} failed: {source}")]
    Llm {
        model: String,
        #[source]
        source: LlmError,
    },

    #[error("Analysis failed due to output format error: {message}")]
    OutputFormat { message: String, raw_output: String },
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ResumeAnalysis, AnalysisError>;
}
