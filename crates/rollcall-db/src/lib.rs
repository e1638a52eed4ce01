//! # Rollcall DB
//!
//! Database pool and the user directory for the Rollcall API.
//!
//! The token middleware hydrates verified claims with the caller's role and
//! school through [`UserDirectory`]. [`PgUserDirectory`] answers that lookup
//! from the `users` table.
//!
//! # Example
//!
//! ```ignore
//! use rollcall_db::{PgUserDirectory, UserDirectory, init_db_pool};
//!
//! let pool = init_db_pool(&database_url).await?;
//! let directory = PgUserDirectory::new(pool);
//! let authority = directory.find_active_user_role_and_tenant(&user_id).await?;
//! ```

pub mod users;

pub use sqlx::PgPool;
pub use users::{DirectoryError, PgUserDirectory, UserAuthority, UserDirectory};

/// Connects a PostgreSQL pool to `database_url`.
///
/// Called once during startup; the returned pool is cheaply cloneable.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    tracing::info!("Database pool initialized");
    Ok(pool)
}
