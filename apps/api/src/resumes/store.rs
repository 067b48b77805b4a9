//! SQL access for stored resumes. One resume per user, upserted in place.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeSummary, TaggedCount};

/// Parameters for saving a resume document.
pub struct SaveParams<'a> {
    pub user_id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub data: &'a serde_json::Value,
    pub source: &'a str,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

pub async fn exists_for_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM resumes WHERE user_id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn upsert(pool: &PgPool, params: SaveParams<'_>) -> Result<ResumeRow, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (user_id, name, email, data, source, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            data = EXCLUDED.data,
            source = EXCLUDED.source,
            ip_address = EXCLUDED.ip_address,
            user_agent = EXCLUDED.user_agent,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(params.user_id)
    .bind(params.name)
    .bind(params.email)
    .bind(params.data)
    .bind(params.source)
    .bind(params.ip_address)
    .bind(params.user_agent)
    .fetch_one(pool)
    .await
}

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_owned(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Deletes the document and returns it, or None if the user owns no such row.
pub async fn delete_owned(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// One page of summaries plus the total match count, newest update first.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    page: i64,
    limit: i64,
    search: Option<&str>,
) -> Result<(Vec<ResumeSummary>, i64), sqlx::Error> {
    let pattern = search
        .map(|s| format!("%{}%", escape_like(s)))
        .unwrap_or_else(|| "%".to_string());
    let offset = (page - 1) * limit;

    let rows = sqlx::query_as::<_, ResumeSummary>(
        r#"
        SELECT id, name, email,
               data->'personalInfo'->>'currentLocation' AS location,
               source, created_at, updated_at
        FROM resumes
        WHERE user_id = $1 AND (name ILIKE $2 OR email ILIKE $2)
        ORDER BY updated_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(&pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM resumes WHERE user_id = $1 AND (name ILIKE $2 OR email ILIKE $2)",
    )
    .bind(user_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
        .fetch_one(pool)
        .await
}

pub async fn count_this_month(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE created_at >= date_trunc('month', now())")
        .fetch_one(pool)
        .await
}

/// Most common skills across all stored resumes.
pub async fn top_skills(pool: &PgPool, limit: i64) -> Result<Vec<TaggedCount>, sqlx::Error> {
    sqlx::query_as::<_, TaggedCount>(
        r#"
        SELECT skill AS value, COUNT(*) AS count
        FROM resumes, jsonb_array_elements_text(data->'skills') AS skill
        GROUP BY skill
        ORDER BY count DESC, skill
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Most common employers across all stored resumes.
pub async fn top_companies(pool: &PgPool, limit: i64) -> Result<Vec<TaggedCount>, sqlx::Error> {
    sqlx::query_as::<_, TaggedCount>(
        r#"
        SELECT entry->>'company' AS value, COUNT(*) AS count
        FROM resumes, jsonb_array_elements(data->'experience') AS entry
        WHERE COALESCE(entry->>'company', '') <> ''
        GROUP BY 1
        ORDER BY count DESC, value
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
