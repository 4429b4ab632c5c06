//! Results dashboard: headline score, skill tags, section feedback, ATS report.

use serde::Serialize;

use crate::analysis::models::{AnalysisResult, ScoredIssues};
use crate::views::ats_report::AtsReportView;
use crate::views::ScoreBand;

#[derive(Debug, Clone, Serialize)]
pub struct ScoreCard {
    pub score: u32,
    /// e.g. "85/100"
    pub label: String,
    pub band: ScoreBand,
    pub issues: Vec<String>,
}

impl From<&ScoredIssues> for ScoreCard {
    fn from(s: &ScoredIssues) -> Self {
        Self {
            score: s.score,
            label: format!("{}/100", s.score),
            band: ScoreBand::of(s.score),
            issues: s.issues.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionCard {
    pub name: String,
    pub score_label: String,
    pub band: ScoreBand,
    pub feedback: String,
    pub improvement_suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub overall_score: u32,
    /// e.g. "72%"
    pub overall_score_label: String,
    pub overall_band: ScoreBand,
    pub match_summary: String,
    pub ats_compatibility: ScoreCard,
    pub formatting: ScoreCard,
    pub ats_simulation: AtsReportView,
    pub matched_skills: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub sections: Vec<SectionCard>,
    pub is_rebuilding: bool,
    pub can_rebuild: bool,
}

impl DashboardView {
    pub fn new(result: &AnalysisResult, is_rebuilding: bool) -> Self {
        Self {
            overall_score: result.overall_score,
            overall_score_label: format!("{}%", result.overall_score),
            overall_band: ScoreBand::of(result.overall_score),
            match_summary: result.match_summary.clone(),
            ats_compatibility: (&result.ats_compatibility).into(),
            formatting: (&result.formatting_analysis).into(),
            ats_simulation: AtsReportView::new(&result.ats_simulation),
            matched_skills: result.skills_match.matched.clone(),
            missing_keywords: result.skills_match.missing.clone(),
            strengths: result.strengths.clone(),
            weaknesses: result.weaknesses.clone(),
            sections: result
                .section_feedback
                .iter()
                .map(|s| SectionCard {
                    name: s.section_name.clone(),
                    score_label: format!("{}/100", s.score),
                    band: ScoreBand::of(s.score),
                    feedback: s.feedback.clone(),
                    improvement_suggestion: s.improvement_suggestion.clone(),
                })
                .collect(),
            is_rebuilding,
            can_rebuild: !is_rebuilding,
        }
    }
}
