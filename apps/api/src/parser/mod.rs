// AI parsing pipeline: prompt construction, model call with one strict
// retry, JSON repair, and coercion into the canonical schema.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod repair;
