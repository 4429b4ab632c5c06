// Resume rebuild: open-ended markdown rewrite guided by a prior analysis.

pub mod document;
pub mod prompts;
pub mod requester;
