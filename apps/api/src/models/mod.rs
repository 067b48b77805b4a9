// Database row types and their response projections.

pub mod resume;
pub mod user;
