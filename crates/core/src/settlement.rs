//! Completion-time billing and the owner/platform split.
//!
//! All arithmetic is integer so the split is exact:
//!
//! ```text
//! elapsed_minutes = ceil((completed_at - start_time) / 60s)
//! total           = round(elapsed_minutes * unit_price / 60)
//! owner_share     = round(total * owner_share_percent / 100)
//! commission      = total - owner_share
//! ```

use chrono::Duration;
use serde::Serialize;

use crate::booking::BookingError;
use crate::pricing::round_half_up_div;
use crate::types::{Amount, Timestamp};

/// Percentage of each payment credited to the spot owner.
pub const DEFAULT_OWNER_SHARE_PERCENT: i64 = 82;

/// Immutable settlement configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementPolicy {
    pub owner_share_percent: i64,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            owner_share_percent: DEFAULT_OWNER_SHARE_PERCENT,
        }
    }
}

/// Final charge for a completed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub elapsed_minutes: i64,
    pub total_amount: Amount,
    pub owner_share: Amount,
    pub commission: Amount,
}

/// Whole minutes between two instants, rounded up. Zero if `end <= start`.
pub fn elapsed_minutes(start: Timestamp, end: Timestamp) -> i64 {
    let elapsed = end - start;
    if elapsed <= Duration::zero() {
        return 0;
    }
    let secs = elapsed.num_seconds();
    let has_fraction = elapsed > Duration::seconds(secs);
    let secs = if has_fraction { secs + 1 } else { secs };
    (secs + 59) / 60
}

/// Split `total` into owner share and commission.
pub fn split(total: Amount, policy: &SettlementPolicy) -> Result<(Amount, Amount), BookingError> {
    let owner_share = total
        .checked_mul(policy.owner_share_percent)
        .and_then(|scaled| round_half_up_div(scaled, 100))
        .ok_or(BookingError::AmountOutOfRange {
            context: "owner share",
        })?;
    Ok((owner_share, total - owner_share))
}

/// Price `elapsed_minutes` at `unit_price` per hour and split the result.
pub fn settle_minutes(
    elapsed_minutes: i64,
    unit_price: Amount,
    policy: &SettlementPolicy,
) -> Result<Settlement, BookingError> {
    let elapsed_minutes = elapsed_minutes.max(0);
    let total_amount = elapsed_minutes
        .checked_mul(unit_price.max(0))
        .and_then(|scaled| round_half_up_div(scaled, 60))
        .ok_or(BookingError::AmountOutOfRange {
            context: "session total",
        })?;
    let (owner_share, commission) = split(total_amount, policy)?;
    Ok(Settlement {
        elapsed_minutes,
        total_amount,
        owner_share,
        commission,
    })
}

/// Settle a session that ran from `start_time` until `completed_at`.
pub fn settle(
    unit_price: Amount,
    start_time: Timestamp,
    completed_at: Timestamp,
    policy: &SettlementPolicy,
) -> Result<Settlement, BookingError> {
    settle_minutes(elapsed_minutes(start_time, completed_at), unit_price, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::MAX_UNIT_PRICE;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn ninety_minutes_at_sixty_per_hour() {
        let start = t0();
        let end = start + Duration::minutes(90);
        let s = settle(60, start, end, &SettlementPolicy::default()).unwrap();
        assert_eq!(
            s,
            Settlement {
                elapsed_minutes: 90,
                total_amount: 90,
                owner_share: 74,
                commission: 16,
            }
        );
    }

    #[test]
    fn partial_minute_rounds_up() {
        let start = t0();
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(1)), 1);
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(60)), 1);
        assert_eq!(elapsed_minutes(start, start + Duration::seconds(61)), 2);
        assert_eq!(elapsed_minutes(start, start + Duration::milliseconds(60_001)), 2);
    }

    #[test]
    fn zero_or_negative_elapsed_is_free() {
        let start = t0();
        assert_eq!(elapsed_minutes(start, start), 0);
        assert_eq!(elapsed_minutes(start, start - Duration::minutes(5)), 0);
        let s = settle(60, start, start - Duration::minutes(5), &SettlementPolicy::default())
            .unwrap();
        assert_eq!(s.total_amount, 0);
        assert_eq!(s.owner_share, 0);
        assert_eq!(s.commission, 0);
    }

    #[test]
    fn seven_splits_six_and_one() {
        assert_eq!(split(7, &SettlementPolicy::default()), Ok((6, 1)));
    }

    #[test]
    fn split_is_exact_for_all_small_totals() {
        let policy = SettlementPolicy::default();
        for total in 0..=2_000 {
            let (share, commission) = split(total, &policy).unwrap();
            assert_eq!(share + commission, total, "total {total}");
            assert!(commission >= 0);
        }
    }

    #[test]
    fn price_per_minute_rounding() {
        // 50/h for 1 minute = 0.833.. -> 1
        let s = settle_minutes(1, 50, &SettlementPolicy::default()).unwrap();
        assert_eq!(s.total_amount, 1);
        // 50/h for 45 minutes = 37.5 -> 38
        let s = settle_minutes(45, 50, &SettlementPolicy::default()).unwrap();
        assert_eq!(s.total_amount, 38);
        assert_eq!(s.owner_share, 31); // 31.16
        assert_eq!(s.commission, 7);
    }

    #[test]
    fn custom_share_percent() {
        let policy = SettlementPolicy {
            owner_share_percent: 100,
        };
        assert_eq!(split(90, &policy), Ok((90, 0)));
    }

    #[test]
    fn ceiling_price_for_a_full_session_fits() {
        // Twelve hours at the highest allowed hourly price.
        let s = settle_minutes(12 * 60, MAX_UNIT_PRICE, &SettlementPolicy::default()).unwrap();
        assert_eq!(s.total_amount, 12_000_000);
        assert_eq!(s.owner_share, 9_840_000);
        assert_eq!(s.commission, 2_160_000);
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let err = settle_minutes(60, i64::MAX / 10, &SettlementPolicy::default()).unwrap_err();
        assert_eq!(
            err,
            BookingError::AmountOutOfRange {
                context: "session total"
            }
        );
    }
}
