//! Admission decisions for new bookings.
//!
//! The repository gathers an [`AdmissionSnapshot`] while holding the
//! per-(spot, vehicle) and per-user locks, then asks [`check_admission`]
//! whether the insert may proceed. Checks run in a fixed order so a
//! request that fails several of them always reports the same reason.

use serde::Serialize;

use crate::booking::BookingError;
use crate::types::DbId;
use crate::vehicle::VehicleType;

/// Namespace tags mixed into advisory lock keys so spot and user locks
/// never collide.
const SPOT_LOCK_TAG: i64 = 1;
const USER_LOCK_TAG: i64 = 2;

/// Occupancy of one (spot, vehicle type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub vehicle_type: VehicleType,
    pub admitted: i64,
    pub capacity: i64,
}

impl Occupancy {
    pub fn available(&self) -> i64 {
        (self.capacity - self.admitted).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.admitted >= self.capacity
    }
}

/// Consistent view of everything admission depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionSnapshot {
    pub spot_id: DbId,
    pub user_id: DbId,
    pub occupancy: Occupancy,
    pub user_has_open_booking: bool,
}

/// Parse and validate a requested vehicle type.
pub fn parse_vehicle_type(raw: Option<&str>) -> Result<VehicleType, BookingError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BookingError::InvalidVehicleType("Vehicle type is required".into()))?;
    raw.parse::<VehicleType>()
        .map_err(|e| BookingError::InvalidVehicleType(e.to_string()))
}

/// Capacity check first, then the one-open-booking-per-user rule.
pub fn check_admission(snapshot: &AdmissionSnapshot) -> Result<(), BookingError> {
    if snapshot.occupancy.is_full() {
        return Err(BookingError::CapacityExceeded {
            spot_id: snapshot.spot_id,
            vehicle_type: snapshot.occupancy.vehicle_type,
            capacity: snapshot.occupancy.capacity,
        });
    }
    if snapshot.user_has_open_booking {
        return Err(BookingError::UserAlreadyBooked {
            user_id: snapshot.user_id,
        });
    }
    Ok(())
}

/// Advisory lock key serializing admissions for one (spot, vehicle type).
pub fn spot_lock_key(spot_id: DbId, vehicle: VehicleType) -> i64 {
    (spot_id << 4) | (vehicle.index() << 2) | SPOT_LOCK_TAG
}

/// Advisory lock key serializing admissions for one user.
pub fn user_lock_key(user_id: DbId) -> i64 {
    (user_id << 4) | USER_LOCK_TAG
}
