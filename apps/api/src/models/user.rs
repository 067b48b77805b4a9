use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    /// Public-facing identifier, e.g. `USER-MBCD12-K3J9X2P1-417`.
    pub public_id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub resume_count: i32,
    pub profile_completeness: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[allow(dead_code)]
    pub updated_at: DateTime<Utc>,
}

/// Account metadata block nested in user payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub joined_date: DateTime<Utc>,
    pub last_login_date: Option<DateTime<Utc>>,
    pub resume_count: i32,
    pub profile_completeness: i32,
}

/// User object returned by the auth endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub profile_info: ProfileInfo,
}

impl UserPayload {
    pub fn from_row(user: &UserRow) -> Self {
        Self {
            id: user.id,
            user_id: user.public_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            profile_info: ProfileInfo {
                joined_date: user.created_at,
                last_login_date: user.last_login_at,
                resume_count: user.resume_count,
                profile_completeness: user.profile_completeness,
            },
        }
    }
}

/// Generates a `USER-<ts36>-<rand8>-<n>` public id: millisecond timestamp
/// in base 36, eight random alphanumerics and a 0..999 suffix, uppercased.
pub fn generate_public_id() -> String {
    let mut rng = rand::rng();
    let timestamp = to_base36(Utc::now().timestamp_millis() as u64);
    let random_str: String = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let random_num: u32 = rng.random_range(0..1000);
    format!("USER-{timestamp}-{random_str}-{random_num}").to_uppercase()
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    buf.iter().rev().collect()
}
