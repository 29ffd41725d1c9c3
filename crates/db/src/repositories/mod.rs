//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept a pool or executor as the first argument.

pub mod booking_repo;
pub mod spot_repo;
pub mod user_repo;
pub mod verification_repo;
pub mod wallet_repo;

pub use booking_repo::BookingRepo;
pub use spot_repo::SpotRepo;
pub use user_repo::UserRepo;
pub use verification_repo::VerificationRepo;
pub use wallet_repo::WalletRepo;

/// Maximum page size for list endpoints.
pub(crate) const MAX_LIMIT: i64 = 100;

/// Default page size for list endpoints.
pub(crate) const DEFAULT_LIMIT: i64 = 50;

/// Clamp an optional page size into `1..=MAX_LIMIT`.
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp an optional offset to be non-negative.
pub(crate) fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
