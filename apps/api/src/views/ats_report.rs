//! Simulated ATS report: readability, parsing risks, and the keyword table.

use serde::Serialize;

use crate::analysis::models::{AtsSimulation, KeywordImportance};
use crate::views::ScoreBand;

#[derive(Debug, Clone, Serialize)]
pub struct AtsReportView {
    pub score: u32,
    pub score_band: ScoreBand,
    /// "HIGH" | "MEDIUM" | "LOW"
    pub readability: &'static str,
    pub structural_risks: Vec<String>,
    pub recommendations: Vec<String>,
    pub keywords: Vec<KeywordRow>,
    pub missing_critical_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordRow {
    pub keyword: String,
    pub importance: KeywordImportance,
    /// "FOUND" | "MISSING"
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl AtsReportView {
    pub fn new(sim: &AtsSimulation) -> Self {
        Self {
            score: sim.score,
            score_band: ScoreBand::of(sim.score),
            readability: sim.parseability_status.label(),
            structural_risks: sim.structural_risks.clone(),
            recommendations: sim.recommendations.clone(),
            keywords: sim
                .keyword_match
                .iter()
                .map(|k| KeywordRow {
                    keyword: k.keyword.clone(),
                    importance: k.importance,
                    status: if k.found_in_resume { "FOUND" } else { "MISSING" },
                    count: k.count,
                })
                .collect(),
            missing_critical_keywords: sim.missing_critical_keywords.clone(),
        }
    }
}
