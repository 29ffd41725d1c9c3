//! Repository for the `verifications` table.
//!
//! Verification purchase and renewal happen elsewhere; bookings only need
//! to know an owner's currently active tier.

use parkify_core::pricing::VerificationTier;
use parkify_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::verification::{ActivateVerification, Verification, VERIFICATION_ACTIVE};

const COLUMNS: &str = "id, owner_id, tier, status, activated_at, expires_at, created_at, updated_at";

pub struct VerificationRepo;

impl VerificationRepo {
    /// Record (or replace) an owner's active verification.
    pub async fn activate(
        pool: &PgPool,
        input: &ActivateVerification,
    ) -> Result<Verification, sqlx::Error> {
        let query = format!(
            "INSERT INTO verifications (owner_id, tier, status, activated_at, expires_at) \
             VALUES ($1, $2, $3, NOW(), $4) \
             ON CONFLICT (owner_id) DO UPDATE \
             SET tier = EXCLUDED.tier, status = EXCLUDED.status, \
                 activated_at = EXCLUDED.activated_at, expires_at = EXCLUDED.expires_at, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(input.owner_id)
            .bind(&input.tier)
            .bind(VERIFICATION_ACTIVE)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// The owner's tier if their verification is active and unexpired at `now`.
    pub async fn active_tier<'e, E>(
        executor: E,
        owner_id: DbId,
        now: Timestamp,
    ) -> Result<Option<VerificationTier>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let tier: Option<String> = sqlx::query_scalar(
            "SELECT tier FROM verifications \
             WHERE owner_id = $1 AND status = $2 \
               AND (expires_at IS NULL OR expires_at > $3)",
        )
        .bind(owner_id)
        .bind(VERIFICATION_ACTIVE)
        .bind(now)
        .fetch_optional(executor)
        .await?;

        Ok(tier.and_then(|t| match t.parse() {
            Ok(tier) => Some(tier),
            Err(e) => {
                tracing::warn!(owner_id, error = %e, "Ignoring unrecognised verification tier");
                None
            }
        }))
    }
}
