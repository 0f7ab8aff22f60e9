use crate::analysis::ResumeAnalysis;

const TOP_SKILLS: usize = 5;
const TOP_SUGGESTIONS: usize = 3;
const TOP_ATS_TIPS: usize = 3;

/// Renders an analysis as a short human-readable summary.
///
/// Lists are truncated to their top entries but headed with the full count;
/// empty lists and an empty experience gap leave their block out.
pub fn format_analysis(analysis: &ResumeAnalysis) -> String {
    let score = analysis.overall_fit_score;
    let mut parts = vec![
        format!("**Overall Fit Score: {score}/100**"),
        score_band(score).to_string(),
    ];

    push_bullets(&mut parts, "Matching Skills", &analysis.matching_skills, TOP_SKILLS);
    push_bullets(&mut parts, "Skills to Develop", &analysis.missing_skills, TOP_SKILLS);

    if !analysis.experience_gap.is_empty() {
        parts.push(format!(
            "\n**Experience Analysis:**\n{}",
            analysis.experience_gap
        ));
    }

    if !analysis.improvement_suggestions.is_empty() {
        parts.push("\n**Top Improvement Suggestions:**".to_string());
        parts.extend(
            analysis
                .improvement_suggestions
                .iter()
                .take(TOP_SUGGESTIONS)
                .enumerate()
                .map(|(i, s)| format!("{}. {s}", i + 1)),
        );
    }

    if !analysis.ats_optimization.is_empty() {
        parts.push("\n**ATS Optimization Tips:**".to_string());
        parts.extend(
            analysis
                .ats_optimization
                .iter()
                .take(TOP_ATS_TIPS)
                .map(|tip| format!("• {tip}")),
        );
    }

    parts.join("\n")
}

fn score_band(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent match for this role!"
    } else if score >= 60.0 {
        "Good match with room for improvement"
    } else {
        "Significant improvements needed"
    }
}

fn push_bullets(parts: &mut Vec<String>, title: &str, items: &[String], top: usize) {
    if items.is_empty() {
        return;
    }
    parts.push(format!("\n**{title} ({}):**", items.len()));
    parts.extend(items.iter().take(top).map(|item| format!("• {item}")));
}
