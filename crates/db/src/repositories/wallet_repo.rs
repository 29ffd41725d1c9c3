//! Repository for owner wallets and the transaction ledger.
//!
//! Balances only ever move through a single atomic
//! `balance = balance + $n` upsert, never a read-modify-write.

use parkify_core::types::{Amount, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::wallet::{SettlementCredit, Wallet, WalletTransaction};

use super::{clamp_limit, clamp_offset};

const WALLET_COLUMNS: &str =
    "id, owner_id, balance, total_earnings, last_transaction_at, created_at, updated_at";

const TX_COLUMNS: &str = "\
    id, owner_id, kind, amount, description, booking_id, \
    total_payment, provider_share, commission, \
    driver_id, driver_name, parking_duration_mins, \
    status, balance_after, created_at";

pub struct WalletRepo;

impl WalletRepo {
    /// Fetch the owner's wallet, creating an empty one on first access.
    pub async fn get_or_create(pool: &PgPool, owner_id: DbId) -> Result<Wallet, sqlx::Error> {
        let query = format!(
            "INSERT INTO wallets (owner_id) VALUES ($1) \
             ON CONFLICT (owner_id) DO UPDATE SET owner_id = EXCLUDED.owner_id \
             RETURNING {WALLET_COLUMNS}"
        );
        sqlx::query_as::<_, Wallet>(&query)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find the owner's wallet without creating it.
    pub async fn find_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Option<Wallet>, sqlx::Error> {
        let query = format!("SELECT {WALLET_COLUMNS} FROM wallets WHERE owner_id = $1");
        sqlx::query_as::<_, Wallet>(&query)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Credit a settlement to the owner's wallet and append the matching
    /// ledger entry.
    ///
    /// Must run inside the caller's transaction so the balance change and
    /// the ledger row commit or roll back together. The unique
    /// `booking_id` constraint rejects a second credit for one booking.
    pub async fn credit_settlement(
        conn: &mut PgConnection,
        credit: &SettlementCredit,
    ) -> Result<WalletTransaction, sqlx::Error> {
        let balance_after: Amount = sqlx::query_scalar(
            "INSERT INTO wallets (owner_id, balance, total_earnings, last_transaction_at) \
             VALUES ($1, $2, $2, NOW()) \
             ON CONFLICT (owner_id) DO UPDATE \
             SET balance = wallets.balance + EXCLUDED.balance, \
                 total_earnings = wallets.total_earnings + EXCLUDED.total_earnings, \
                 last_transaction_at = NOW(), \
                 updated_at = NOW() \
             RETURNING balance",
        )
        .bind(credit.owner_id)
        .bind(credit.provider_share)
        .fetch_one(&mut *conn)
        .await?;

        let query = format!(
            "INSERT INTO wallet_transactions \
                 (owner_id, kind, amount, description, booking_id, \
                  total_payment, provider_share, commission, \
                  driver_id, driver_name, parking_duration_mins, status, balance_after) \
             VALUES ($1, 'credit', $2, $3, $4, $5, $6, $7, $8, $9, $10, 'completed', $11) \
             RETURNING {TX_COLUMNS}"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(credit.owner_id)
            .bind(credit.provider_share)
            .bind(credit.description())
            .bind(credit.booking_id)
            .bind(credit.total_payment)
            .bind(credit.provider_share)
            .bind(credit.commission)
            .bind(credit.driver_id)
            .bind(&credit.driver_name)
            .bind(credit.parking_duration_mins)
            .bind(balance_after)
            .fetch_one(&mut *conn)
            .await
    }

    /// List an owner's ledger entries, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        owner_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {TX_COLUMNS} FROM wallet_transactions \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(owner_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// The settlement credit recorded for a booking, if any.
    pub async fn find_by_booking(
        pool: &PgPool,
        booking_id: DbId,
    ) -> Result<Option<WalletTransaction>, sqlx::Error> {
        let query = format!("SELECT {TX_COLUMNS} FROM wallet_transactions WHERE booking_id = $1");
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(booking_id)
            .fetch_optional(pool)
            .await
    }
}
