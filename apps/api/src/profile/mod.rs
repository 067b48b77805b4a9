// Profile completeness scoring and the profile/analytics endpoints.

pub mod completeness;
pub mod handlers;
