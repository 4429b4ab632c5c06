// Resume analysis: fit scoring plus a simulated ATS parse, produced by the model
// under a fixed response schema.

pub mod models;
pub mod prompts;
pub mod requester;
pub mod schema;
