use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored resume: one row per user, the parsed document kept as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    #[allow(dead_code)]
    pub user_id: Uuid,
    /// Denormalized from `personalInfo` for search and listing.
    pub name: String,
    pub email: String,
    pub data: Value,
    pub source: String,
    /// Audit trail stamped at save time; kept out of client responses.
    #[allow(dead_code)]
    pub ip_address: Option<String>,
    #[allow(dead_code)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection, cheap enough to fetch a page at a time.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `(value, count)` pair from the analytics aggregations.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaggedCount {
    pub value: String,
    pub count: i64,
}
