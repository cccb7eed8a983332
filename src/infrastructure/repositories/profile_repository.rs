//! Profile Repository Implementation
//!
//! Read-only projection of the identity collaborator's user and profile
//! tables into the minimal display info the chat core needs: email, type,
//! and a display name/avatar sourced from the creator or business profile.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{ProfileRepository, UserProfile, UserType};
use crate::shared::error::AppError;

/// Joined row across users and both profile tables.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    email: String,
    user_type: String,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar_url: Option<String>,
    company_name: Option<String>,
    logo_url: Option<String>,
}

impl ProfileRow {
    fn into_profile(self) -> Option<UserProfile> {
        let user_type = UserType::from_str(&self.user_type)?;
        let (display_name, avatar_url) = match user_type {
            UserType::Creator => {
                let name = match (self.first_name, self.last_name) {
                    (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
                    (Some(f), None) => Some(f),
                    (None, Some(l)) => Some(l),
                    (None, None) => None,
                };
                (name, self.avatar_url)
            }
            UserType::Business => (self.company_name, self.logo_url),
            UserType::Admin => (None, None),
        };

        Some(UserProfile {
            user_id: self.user_id,
            email: self.email,
            user_type,
            display_name,
            avatar_url,
        })
    }
}

const PROFILE_SELECT: &str = r#"
    SELECT u.id AS user_id, u.email, u.user_type,
           cp.first_name, cp.last_name, cp.avatar_url,
           bp.company_name, bp.logo_url
    FROM users u
    LEFT JOIN creator_profiles cp ON cp.user_id = u.id
    LEFT JOIN business_profiles bp ON bp.user_id = u.id
"#;

/// PostgreSQL profile repository implementation.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new PgProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{} WHERE u.id = $1", PROFILE_SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|r| r.into_profile()))
    }

    async fn find_profiles(&self, user_ids: &[i64]) -> Result<Vec<UserProfile>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{} WHERE u.id = ANY($1)",
            PROFILE_SELECT
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(|r| r.into_profile()).collect())
    }
}
