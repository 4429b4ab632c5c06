//! Structured analysis returned by the model. Field names match the wire (camelCase)
//! and the response schema in `analysis::schema`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for every score in the record; the lower bound is enforced by `u32`.
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u32,
    pub match_summary: String,
    pub skills_match: SkillsMatch,
    pub ats_compatibility: ScoredIssues,
    pub ats_simulation: AtsSimulation,
    pub formatting_analysis: ScoredIssues,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub section_feedback: Vec<SectionFeedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsMatch {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// A 0–100 score with the issues that lowered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIssues {
    pub score: u32,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsSimulation {
    pub score: u32,
    pub parseability_status: Parseability,
    /// e.g. "Double columns detected", "Images used for text"
    pub structural_risks: Vec<String>,
    pub keyword_match: Vec<AtsKeyword>,
    pub missing_critical_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

/// How reliably an ATS-like parser could extract the document's text and structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parseability {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

impl Parseability {
    pub const ALL: [&'static str; 3] = ["High", "Medium", "Low"];

    pub fn label(self) -> &'static str {
        match self {
            Parseability::High => "HIGH",
            Parseability::Medium => "MEDIUM",
            Parseability::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsKeyword {
    pub keyword: String,
    pub importance: KeywordImportance,
    pub found_in_resume: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordImportance {
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
}

impl KeywordImportance {
    pub const ALL: [&'static str; 3] = ["Critical", "High", "Medium"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionFeedback {
    pub section_name: String,
    pub score: u32,
    pub feedback: String,
    pub improvement_suggestion: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field} = {value} is outside 0..=100")]
pub struct ScoreOutOfRange {
    pub field: String,
    pub value: u32,
}

impl AnalysisResult {
    /// Checks every score lies in [0, 100]. Enumerations are already enforced by serde.
    pub fn validate(&self) -> Result<(), ScoreOutOfRange> {
        let check = |field: String, value: u32| {
            if value > MAX_SCORE {
                Err(ScoreOutOfRange { field, value })
            } else {
                Ok(())
            }
        };

        check("overallScore".into(), self.overall_score)?;
        check("atsCompatibility.score".into(), self.ats_compatibility.score)?;
        check("atsSimulation.score".into(), self.ats_simulation.score)?;
        check("formattingAnalysis.score".into(), self.formatting_analysis.score)?;
        for (i, section) in self.section_feedback.iter().enumerate() {
            check(format!("sectionFeedback[{i}].score"), section.score)?;
        }
        Ok(())
    }
}
