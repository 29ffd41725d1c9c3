//! Booking lifecycle: statuses, cancel reasons, and the transition table.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──activate(otp)──▶ active ──complete──▶ completed
//!    │                     │                          │
//!    └──decline/cancel─────┴────────cancel────────────┴──▶ cancelled(reason)
//! ```
//!
//! `completed` and `cancelled` are terminal. Every transition is expressed
//! as [`BookingStatus::apply`] so the repositories can validate a move
//! before issuing the guarded `UPDATE ... WHERE status_id = $expected`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::pricing::MAX_UNIT_PRICE;
use crate::status::{define_status_enum, StatusId};
use crate::types::{Amount, DbId};
use crate::vehicle::VehicleType;

define_status_enum! {
    /// Booking lifecycle status.
    BookingStatus {
        Pending = 1 => "pending",
        Confirmed = 2 => "confirmed",
        Active = 3 => "active",
        Completed = 4 => "completed",
        Cancelled = 5 => "cancelled",
    }
}

/// Statuses that occupy a slot and count against the per-user limit.
pub const OPEN_STATUSES: [BookingStatus; 3] = [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Active,
];

/// [`OPEN_STATUSES`] as database IDs, for `status_id = ANY($n)` binds.
pub fn open_status_ids() -> Vec<StatusId> {
    OPEN_STATUSES.iter().map(|s| s.id()).collect()
}

/// Something a caller asks the state machine to do to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Decline,
    Cancel,
    Activate,
    Complete,
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirm => "confirm",
            Self::Decline => "decline",
            Self::Cancel => "cancel",
            Self::Activate => "activate",
            Self::Complete => "complete",
        })
    }
}

/// Why a booking ended up `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    OwnerDeclined,
    DriverCancelled,
    AdminCancelled,
}

impl CancelReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OwnerDeclined => "owner_declined",
            Self::DriverCancelled => "driver_cancelled",
            Self::AdminCancelled => "admin_cancelled",
        }
    }
}

impl FromStr for CancelReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner_declined" => Ok(Self::OwnerDeclined),
            "driver_cancelled" => Ok(Self::DriverCancelled),
            "admin_cancelled" => Ok(Self::AdminCancelled),
            other => Err(format!("Unknown cancel reason '{other}'")),
        }
    }
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    /// True while the booking holds a slot.
    pub fn is_open(self) -> bool {
        OPEN_STATUSES.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_open()
    }

    /// Target status for `action` taken from `self`, or `None` if the move
    /// is not in the transition table.
    pub fn next(self, action: BookingAction) -> Option<BookingStatus> {
        use BookingAction as A;
        use BookingStatus as S;

        match (self, action) {
            (S::Pending, A::Confirm) => Some(S::Confirmed),
            (S::Pending | S::Confirmed, A::Decline) => Some(S::Cancelled),
            (S::Pending | S::Confirmed | S::Active, A::Cancel) => Some(S::Cancelled),
            (S::Confirmed, A::Activate) => Some(S::Active),
            (S::Active, A::Complete) => Some(S::Completed),
            _ => None,
        }
    }

    /// Like [`next`](Self::next) but reports an illegal move as
    /// [`BookingError::InvalidTransition`].
    pub fn apply(
        self,
        booking_id: DbId,
        action: BookingAction,
    ) -> Result<BookingStatus, BookingError> {
        self.next(action).ok_or(BookingError::InvalidTransition {
            booking_id,
            from: self,
            action,
        })
    }
}

impl BookingAction {
    /// Status IDs from which this action is legal, for guarded
    /// `UPDATE ... WHERE status_id = ANY($n)` statements.
    pub fn source_status_ids(self) -> Vec<StatusId> {
        BookingStatus::ALL
            .into_iter()
            .filter(|s| s.next(self).is_some())
            .map(BookingStatus::id)
            .collect()
    }
}

/// Rejections raised by admission control and the booking state machine.
///
/// All variants are expected, recoverable outcomes; infrastructure failures
/// travel separately as `sqlx::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("{0}")]
    InvalidVehicleType(String),

    #[error("Invalid price {0}: must be between 0 and {MAX_UNIT_PRICE}")]
    InvalidPrice(Amount),

    /// A charge does not fit in an `Amount`.
    #[error("Amount out of range while pricing {context}")]
    AmountOutOfRange { context: &'static str },

    #[error("Parking spot {0} not found")]
    SpotNotFound(DbId),

    #[error("No {vehicle_type} slots left at spot {spot_id} (capacity {capacity})")]
    CapacityExceeded {
        spot_id: DbId,
        vehicle_type: VehicleType,
        capacity: i64,
    },

    #[error("User {user_id} already has an open booking")]
    UserAlreadyBooked { user_id: DbId },

    #[error("Booking {0} not found")]
    NotFound(DbId),

    #[error("Wrong OTP for booking {booking_id}")]
    WrongOtp { booking_id: DbId },

    #[error("Cannot {action} booking {booking_id} while it is {from}")]
    InvalidTransition {
        booking_id: DbId,
        from: BookingStatus,
        action: BookingAction,
    },
}

impl BookingError {
    /// Machine-readable code returned to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidVehicleType(_) => "INVALID_VEHICLE_TYPE",
            Self::InvalidPrice(_) => "VALIDATION_ERROR",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::SpotNotFound(_) => "SPOT_NOT_FOUND",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::UserAlreadyBooked { .. } => "USER_ALREADY_BOOKED",
            Self::NotFound(_) => "BOOKING_NOT_FOUND",
            Self::WrongOtp { .. } => "WRONG_OTP",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}
