// LLM prompt templates for the rewrite call.

use crate::analysis::models::AnalysisResult;
use crate::llm_client::prompts::FACTUALITY_INSTRUCTION;

/// Rewrite prompt template.
/// Replace: {factuality}, {job_description}, {weaknesses_json}, {structural_risks_json}
pub const REBUILD_PROMPT_TEMPLATE: &str = r#"You are a Professional Resume Writer.
Rewrite the attached resume to target the following job description.

JOB DESCRIPTION:
"{job_description}"

WEAKNESSES TO FIX (from a prior analysis):
{weaknesses_json}

ATS STRUCTURAL RISKS TO REMOVE:
{structural_risks_json}

{factuality}

INSTRUCTIONS:
1. Output ONLY the resume content in clean Markdown. No preamble, no closing remarks.
2. Rewrite the Professional Summary to be impactful and keyword-rich for this job.
3. Rewrite Experience bullet points with strong action verbs and quantified results where the
   document supports them. Align them with the job requirements.
4. Reorder skills so the ones most relevant to this job come first.
5. Keep the tone professional, confident, and concise.
6. Structure the document with clear headers (# Summary, ## Experience, ## Skills, ## Education, etc.).
7. Do NOT use columns or tables anywhere; the output must be a single-column document for ATS parsing."#;

pub fn build_rebuild_prompt(job_description: &str, analysis: &AnalysisResult) -> String {
    // Vec<String> always serializes
    let weaknesses = serde_json::to_string(&analysis.weaknesses).unwrap_or_default();
    let risks =
        serde_json::to_string(&analysis.ats_simulation.structural_risks).unwrap_or_default();

    REBUILD_PROMPT_TEMPLATE
        .replace("{factuality}", FACTUALITY_INSTRUCTION)
        .replace("{weaknesses_json}", &weaknesses)
        .replace("{structural_risks_json}", &risks)
        .replace("{job_description}", job_description.trim())
}
