//! LLM-backed resume analyzer with model fallback and one output-repair round.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_USER_PROMPT, FORMAT_INSTRUCTIONS};
use crate::analysis::{AnalysisError, AnalysisRequest, ResumeAnalysis, ResumeAnalyzer};
use crate::llm_client::prompts::{build_repair_prompt, JSON_ONLY_SYSTEM};
use crate::llm_client::{strip_json_fences, ChatCompletion};

/// Tries each configured model in order. A transport or API failure moves on
/// to the next model; malformed output gets one repair round on the model
/// that produced it and is final after that.
pub struct LlmResumeAnalyzer {
    llm: Arc<dyn ChatCompletion>,
    models: Vec<String>,
}

impl LlmResumeAnalyzer {
    /// Blank model names are dropped.
    pub fn new(llm: Arc<dyn ChatCompletion>, models: Vec<String>) -> Self {
        let models = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        Self { llm, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    async fn parse_or_repair(
        &self,
        model: &str,
        output: String,
    ) -> Result<ResumeAnalysis, AnalysisError> {
        let message = match parse_analysis(&output) {
            Ok(analysis) => return Ok(analysis),
            Err(message) => message,
        };

        warn!(model, error = %message, "analysis output malformed, asking model to repair it");
        let repair_prompt = build_repair_prompt(FORMAT_INSTRUCTIONS, &output, &message);
        let repaired = match self
            .llm
            .complete(model, JSON_ONLY_SYSTEM, &repair_prompt)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!(model, error = %e, raw_output = %output, "repair call failed");
                return Err(AnalysisError::OutputFormat {
                    message,
                    raw_output: output,
                });
            }
        };

        parse_analysis(&repaired).map_err(|message| {
            error!(model, error = %message, raw_output = %repaired, "repaired output still malformed");
            AnalysisError::OutputFormat {
                message,
                raw_output: repaired,
            }
        })
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ResumeAnalysis, AnalysisError> {
        if request.resume_text.trim().is_empty() {
            return Err(AnalysisError::EmptyResume);
        }
        if request.job_description.trim().is_empty() {
            return Err(AnalysisError::EmptyJobDescription);
        }

        let system = build_analysis_prompt(&request.resume_text, &request.job_description);
        let mut last_error = None;

        for model in &self.models {
            match self.llm.complete(model, &system, ANALYSIS_USER_PROMPT).await {
                Ok(output) => {
                    let analysis = self.parse_or_repair(model, output).await?;
                    info!(
                        model = %model,
                        score = analysis.overall_fit_score,
                        "resume analysis completed"
                    );
                    return Ok(analysis);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "model call failed, trying next model");
                    last_error = Some(AnalysisError::Llm {
                        model: model.clone(),
                        source: e,
                    });
                }
            }
        }

        Err(last_error.unwrap_or(AnalysisError::NoModelAvailable))
    }
}

/// Parses model output into a `ResumeAnalysis`, returning a description of
/// the problem when it does not fit the schema.
fn parse_analysis(output: &str) -> Result<ResumeAnalysis, String> {
    let analysis: ResumeAnalysis =
        serde_json::from_str(strip_json_fences(output)).map_err(|e| e.to_string())?;
    if !(0.0..=100.0).contains(&analysis.overall_fit_score) {
        return Err(format!(
            "overall_fit_score {} is outside 0-100",
            analysis.overall_fit_score
        ));
    }
    Ok(analysis)
}
