//! Persistence layer for the Parkify booking service.
//!
//! Row models live in [`models`], SQL in [`repositories`]. Operations that
//! can be rejected on domain grounds (admission, state transitions,
//! settlement) return [`LifecycleError`]; plain reads return `sqlx::Error`.

use std::time::Duration;

use parkify_core::booking::BookingError;
use parkify_core::status::StatusId;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Pool sizing and acquisition bounds.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, settings: PoolSettings) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Failure of a booking lifecycle operation.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Expected, recoverable rejection (capacity, wrong OTP, bad transition, ...).
    #[error(transparent)]
    Rejected(#[from] BookingError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A stored `status_id` has no matching `BookingStatus`.
    #[error("Booking {booking_id} has unknown status id {status_id}")]
    UnknownStatus { booking_id: i64, status_id: StatusId },

    /// A stored row violates a lifecycle invariant.
    #[error("Booking {booking_id} is inconsistent: {detail}")]
    Inconsistent {
        booking_id: i64,
        detail: &'static str,
    },
}
