//! Owner wallet and transaction ledger models.

use parkify_core::types::{Amount, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `wallets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wallet {
    pub id: DbId,
    pub owner_id: DbId,
    pub balance: Amount,
    pub total_earnings: Amount,
    pub last_transaction_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `wallet_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WalletTransaction {
    pub id: DbId,
    pub owner_id: DbId,
    pub kind: String,
    /// Net amount moved (the owner share for settlement credits).
    pub amount: Amount,
    pub description: String,
    pub booking_id: Option<DbId>,
    /// Gross amount paid by the driver.
    pub total_payment: Option<Amount>,
    pub provider_share: Option<Amount>,
    pub commission: Option<Amount>,
    pub driver_id: Option<DbId>,
    pub driver_name: Option<String>,
    pub parking_duration_mins: Option<i64>,
    pub status: String,
    pub balance_after: Amount,
    pub created_at: Timestamp,
}

/// Settlement credit to append for a completed booking.
#[derive(Debug, Clone)]
pub struct SettlementCredit {
    pub owner_id: DbId,
    pub booking_id: DbId,
    pub driver_id: DbId,
    pub driver_name: String,
    pub total_payment: Amount,
    pub provider_share: Amount,
    pub commission: Amount,
    pub parking_duration_mins: i64,
    pub payment_reference: Option<String>,
}

impl SettlementCredit {
    pub fn description(&self) -> String {
        let mut text = format!(
            "Booking #{} payment - {} total ({} share, {} commission)",
            self.booking_id, self.total_payment, self.provider_share, self.commission
        );
        if let Some(reference) = &self.payment_reference {
            text.push_str(&format!(" [payment {reference}]"));
        }
        text
    }
}
