//! Unit price resolution and verification-tier price boosts.
//!
//! A booking's hourly price is captured once at creation and never follows
//! later changes to the spot. Resolution order:
//!
//! 1. an explicit price in the request (taken as-is),
//! 2. the spot's per-vehicle rate,
//! 3. the spot's flat rate,
//! 4. the configured default.
//!
//! Spot-derived prices (2-4) are raised by the owner's active verification
//! tier boost.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::booking::BookingError;
use crate::types::Amount;
use crate::vehicle::{PerVehicle, VehicleType};

/// Hourly price used when neither the request nor the spot supplies one.
pub const DEFAULT_UNIT_PRICE: Amount = 50;

/// Largest hourly price a booking or spot may carry. Must match the
/// `CHECK` constraints on `bookings.unit_price` and the spot price columns.
pub const MAX_UNIT_PRICE: Amount = 1_000_000;

/// `round(numerator / denominator)` with halves rounded up, for
/// non-negative numerators and positive denominators. `None` on overflow.
pub fn round_half_up_div(numerator: i64, denominator: i64) -> Option<i64> {
    debug_assert!(denominator > 0);
    let doubled = numerator.checked_mul(2)?.checked_add(denominator)?;
    Some(doubled.div_euclid(denominator.checked_mul(2)?))
}

/// Owner verification tiers. Only an active verification counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationTier {
    Silver,
    Gold,
    Platinum,
}

impl VerificationTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }
}

impl FromStr for VerificationTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            other => Err(format!("Unknown verification tier '{other}'")),
        }
    }
}

/// Percentage price increase per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierBoosts {
    pub silver: i64,
    pub gold: i64,
    pub platinum: i64,
}

impl Default for TierBoosts {
    fn default() -> Self {
        Self {
            silver: 5,
            gold: 10,
            platinum: 15,
        }
    }
}

impl TierBoosts {
    pub fn percent_for(&self, tier: VerificationTier) -> i64 {
        match tier {
            VerificationTier::Silver => self.silver,
            VerificationTier::Gold => self.gold,
            VerificationTier::Platinum => self.platinum,
        }
    }
}

/// Immutable pricing configuration, built once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub default_unit_price: Amount,
    pub tier_boosts: TierBoosts,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            default_unit_price: DEFAULT_UNIT_PRICE,
            tier_boosts: TierBoosts::default(),
        }
    }
}

/// The price-relevant slice of a parking spot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpotRates {
    pub per_vehicle: PerVehicle<Amount>,
    pub flat: Option<Amount>,
}

/// Where a resolved unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Requested,
    VehicleRate,
    FlatRate,
    Default,
}

/// Result of price resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub unit_price: Amount,
    pub source: PriceSource,
    /// Tier boost applied, in percent (0 when none).
    pub boost_percent: i64,
}

/// Apply a percentage boost, rounding half up.
pub fn apply_boost(base: Amount, percent: i64) -> Result<Amount, BookingError> {
    if percent == 0 {
        return Ok(base);
    }
    100i64
        .checked_add(percent)
        .and_then(|factor| base.checked_mul(factor))
        .and_then(|scaled| round_half_up_div(scaled, 100))
        .ok_or(BookingError::AmountOutOfRange {
            context: "tier boost",
        })
}

/// Resolve the hourly unit price for a new booking.
pub fn resolve_unit_price(
    requested: Option<Amount>,
    rates: &SpotRates,
    vehicle: VehicleType,
    tier: Option<VerificationTier>,
    policy: &PricingPolicy,
) -> Result<PriceQuote, BookingError> {
    if let Some(price) = requested {
        if !(0..=MAX_UNIT_PRICE).contains(&price) {
            return Err(BookingError::InvalidPrice(price));
        }
        return Ok(PriceQuote {
            unit_price: price,
            source: PriceSource::Requested,
            boost_percent: 0,
        });
    }

    let (base, source) = match (rates.per_vehicle.get(vehicle), rates.flat) {
        (Some(rate), _) => (rate, PriceSource::VehicleRate),
        (None, Some(flat)) => (flat, PriceSource::FlatRate),
        (None, None) => (policy.default_unit_price, PriceSource::Default),
    };

    let boost_percent = tier
        .map(|t| policy.tier_boosts.percent_for(t))
        .unwrap_or(0);

    let unit_price = apply_boost(base.max(0), boost_percent)?;
    if unit_price > MAX_UNIT_PRICE {
        return Err(BookingError::InvalidPrice(unit_price));
    }

    Ok(PriceQuote {
        unit_price,
        source,
        boost_percent,
    })
}
