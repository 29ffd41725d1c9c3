//! Repository for the `users` table.

use parkify_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, role, created_at, updated_at";

/// Display name used when a booking's driver no longer exists.
pub const UNKNOWN_DRIVER: &str = "Unknown";

/// Read access to users, plus inserts for seeding.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Display name for `id`, or [`UNKNOWN_DRIVER`] if the user is gone.
    pub async fn display_name<'e, E>(executor: E, id: DbId) -> Result<String, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(name.unwrap_or_else(|| UNKNOWN_DRIVER.to_string()))
    }
}
