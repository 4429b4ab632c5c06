// LLM prompt templates for the analysis call.

use crate::llm_client::prompts::ATS_RISK_CHECKLIST;

/// Analysis prompt template. Replace `{ats_risks}` and `{job_description}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert HR Recruitment Specialist and a Technical ATS (Applicant Tracking System) Auditor.

The candidate's resume is attached as a document or image.

TASK 1: CONTENT ANALYSIS
Analyze the attached resume against the job description below.
- Score the overall fit from 0 to 100 and summarize it in 2-3 sentences.
- List the job's skills the resume demonstrates (matched) and the ones it lacks (missing).
- Give feedback per resume section with a 0-100 score and one concrete improvement suggestion.

TASK 2: ATS SIMULATION
Simulate a legacy ATS parser scanning the attached resume.
- Flag parsing blockers. Look specifically for:
{ats_risks}
- Perform a strict KEYWORD EXTRACTION from the job description. Rate each keyword's importance
  as exactly one of "Critical", "High" or "Medium", and check whether it literally appears in the
  resume text. Report how many times it appears when it does.
- Rate the system readability (parseabilityStatus) as exactly one of "High", "Medium" or "Low".
- Give specific, actionable fix recommendations.

Every score is an integer between 0 and 100.
Be critical. If the resume has two columns, flag it as a structural risk.

JOB DESCRIPTION:
"{job_description}""#;

pub fn build_analysis_prompt(job_description: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{ats_risks}", ATS_RISK_CHECKLIST)
        .replace("{job_description}", job_description.trim())
}
