// LLM prompts for resume analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Human turn sent after the analysis system prompt.
pub const ANALYSIS_USER_PROMPT: &str =
    "Please analyze this resume and provide your detailed assessment in JSON format.";

/// Describes the `ResumeAnalysis` JSON document the model must return.
pub const FORMAT_INSTRUCTIONS: &str = r#"Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_fit_score": 72.5,
  "missing_skills": ["Skill required by the job but absent from the resume"],
  "matching_skills": ["Skill present in both the resume and the job description"],
  "experience_gap": "Analysis of experience gaps or mismatches",
  "improvement_suggestions": ["Concrete suggestion to improve the resume"],
  "suggested_bullet_points": {
    "Experience": ["Improved bullet point for this resume section"]
  },
  "ats_optimization": ["ATS (Applicant Tracking System) optimization suggestion"],
  "confidence_score": "High"
}

Field rules:
- overall_fit_score: number between 0 and 100
- confidence_score: exactly one of "High", "Medium", "Low"
- suggested_bullet_points: keys are resume section names, values are lists of bullets"#;

/// Builds the analysis system prompt around the resume and job description.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "You are an expert resume analyst and career coach with extensive experience in \
recruitment and ATS systems.

Your task is to analyze the provided resume against the given job description and provide \
comprehensive feedback.

**Analysis Guidelines:**
1. **Scoring**: Provide an overall fit score (0-100) based on skills match, experience \
relevance, and role alignment.
2. **Skills Analysis**: Identify missing skills from the job requirements and highlight \
matching skills.
3. **Experience Gap**: Analyze any experience mismatches or gaps compared to job requirements.
4. **Improvement Suggestions**: Provide actionable advice to strengthen the resume.
5. **ATS Optimization**: Suggest keywords and formatting improvements for ATS compatibility.
6. **Bullet Points**: Rewrite key bullet points to be more impactful and relevant.

**Resume Content:**
{resume_text}

**Job Description:**
{job_description}

**Output Requirements:**
- Return your analysis in the exact JSON format specified in the schema
- Be specific and actionable in your suggestions
- Use industry-standard terminology
- Ensure all suggestions are realistic and implementable
- Focus on measurable improvements

{FORMAT_INSTRUCTIONS}

{JSON_ONLY_SYSTEM}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs_verbatim() {
        let prompt = build_analysis_prompt("Skills\nRust {braces}", "Senior Rust engineer");
        assert!(prompt.contains("**Resume Content:**\nSkills\nRust {braces}\n"));
        assert!(prompt.contains("**Job Description:**\nSenior Rust engineer\n"));
    }

    #[test]
    fn test_prompt_carries_format_instructions() {
        let prompt = build_analysis_prompt("r", "j");
        assert!(prompt.contains(FORMAT_INSTRUCTIONS));
        assert!(prompt.ends_with(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_format_instructions_example_is_valid_json() {
        let start = FORMAT_INSTRUCTIONS.find('{').unwrap();
        let end = FORMAT_INSTRUCTIONS.rfind('}').unwrap();
        let example: serde_json::Value =
            serde_json::from_str(&FORMAT_INSTRUCTIONS[start..=end]).unwrap();
        assert!(example["overall_fit_score"].is_number());
    }
}
