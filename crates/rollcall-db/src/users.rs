//! Role and school lookups for token hydration.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use rollcall_auth::Role;

/// Errors raised while looking up a user.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User directory unavailable: {0}")]
    Unavailable(String),
}

/// The authority data of an active user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthority {
    pub role: Role,
    pub school_id: Option<String>,
}

/// Looks up a user's current role and school.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `None` when the user does not exist or is inactive.
    async fn find_active_user_role_and_tenant(
        &self,
        user_id: &str,
    ) -> Result<Option<UserAuthority>, DirectoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct UserAuthorityRow {
    role: String,
    school_id: Option<Uuid>,
    is_active: bool,
}

/// [`UserDirectory`] backed by the PostgreSQL `users` table.
#[derive(Clone, Debug)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[tracing::instrument(skip(self), fields(db.table = "users"))]
    async fn find_active_user_role_and_tenant(
        &self,
        user_id: &str,
    ) -> Result<Option<UserAuthority>, DirectoryError> {
        // Ids that are not UUIDs cannot match a row
        let Ok(id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserAuthorityRow>(
            "SELECT role, school_id, is_active FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.and_then(into_authority))
    }
}

fn into_authority(row: UserAuthorityRow) -> Option<UserAuthority> {
    if !row.is_active {
        return None;
    }

    Some(UserAuthority {
        role: Role::from(row.role),
        school_id: row.school_id.map(|id| id.to_string()),
    })
}
