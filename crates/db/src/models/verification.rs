//! Owner verification (insurance tier) model.

use parkify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Verification status values stored in `verifications.status`.
pub const VERIFICATION_ACTIVE: &str = "active";

/// A row from the `verifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Verification {
    pub id: DbId,
    pub owner_id: DbId,
    pub tier: String,
    pub status: String,
    pub activated_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an activated verification.
#[derive(Debug, Deserialize)]
pub struct ActivateVerification {
    pub owner_id: DbId,
    pub tier: String,
    pub expires_at: Option<Timestamp>,
}
