//! Response schema sent with the analysis call (Gemini OpenAPI subset).
//!
//! Must stay in lockstep with `analysis::models::AnalysisResult`; the tests below
//! compare the two.

use serde_json::{json, Value};

use crate::analysis::models::{KeywordImportance, Parseability, MAX_SCORE};

fn score(description: &str) -> Value {
    json!({
        "type": "INTEGER",
        "minimum": 0,
        "maximum": MAX_SCORE,
        "description": description
    })
}

fn string_list(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description
    })
}

fn scored_issues(description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "description": description,
        "properties": {
            "score": score("0-100"),
            "issues": string_list("Concrete problems that lowered the score")
        },
        "required": ["score", "issues"]
    })
}

pub fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallScore": score("0-100 score indicating fit"),
            "matchSummary": { "type": "STRING", "description": "A brief 2-3 sentence summary of the fit." },
            "skillsMatch": {
                "type": "OBJECT",
                "properties": {
                    "matched": string_list("Job skills evidenced in the resume"),
                    "missing": string_list("Job skills absent from the resume")
                },
                "required": ["matched", "missing"]
            },
            "atsCompatibility": scored_issues("General ATS compatibility"),
            "atsSimulation": {
                "type": "OBJECT",
                "description": "Detailed ATS simulation results",
                "properties": {
                    "score": score("0-100 simulated parse score"),
                    "parseabilityStatus": {
                        "type": "STRING",
                        "enum": Parseability::ALL,
                        "description": "High, Medium, or Low"
                    },
                    "structuralRisks": string_list("Specific layout issues like Tables, Columns, Graphics"),
                    "keywordMatch": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "keyword": { "type": "STRING" },
                                "importance": {
                                    "type": "STRING",
                                    "enum": KeywordImportance::ALL,
                                    "description": "Critical, High, or Medium"
                                },
                                "foundInResume": { "type": "BOOLEAN" },
                                "count": { "type": "INTEGER", "minimum": 0 }
                            },
                            "required": ["keyword", "importance", "foundInResume"]
                        }
                    },
                    "missingCriticalKeywords": string_list("Critical keywords not found"),
                    "recommendations": string_list("Specific fixes for the ATS issues")
                },
                "required": [
                    "score", "parseabilityStatus", "structuralRisks",
                    "keywordMatch", "missingCriticalKeywords", "recommendations"
                ]
            },
            "formattingAnalysis": scored_issues("Formatting quality"),
            "strengths": string_list("What the resume does well for this job"),
            "weaknesses": string_list("What the resume should fix for this job"),
            "sectionFeedback": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sectionName": { "type": "STRING" },
                        "score": score("0-100"),
                        "feedback": { "type": "STRING" },
                        "improvementSuggestion": { "type": "STRING" }
                    },
                    "required": ["sectionName", "score", "feedback", "improvementSuggestion"]
                }
            }
        },
        "required": [
            "overallScore", "matchSummary", "skillsMatch", "atsCompatibility",
            "atsSimulation", "formattingAnalysis", "strengths", "weaknesses", "sectionFeedback"
        ]
    })
}
