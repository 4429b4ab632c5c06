// Shared prompt fragments.
// Each requester defines its own prompts.rs alongside it; this file holds the
// fragments both the analysis and the rewrite prompts rely on.

/// Forbids invented history. Appended to every prompt that touches resume content.
pub const FACTUALITY_INSTRUCTION: &str = "\
    CRITICAL: Keep the candidate's factual history (dates, companies, job titles, degrees, \
    certifications) exactly as it appears in the document. \
    Do NOT infer, interpolate, or invent experience, employers, metrics, or credentials.";

/// The layout features a naive ATS text extractor fails on.
pub const ATS_RISK_CHECKLIST: &str = "\
    - multi-column layouts (text read across columns in the wrong order)\n\
    - tables used for layout\n\
    - contact details or dates placed in page headers/footers\n\
    - icons, images or graphics used in place of text\n\
    - unusual or decorative fonts";
