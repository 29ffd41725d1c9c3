//! Booking entity models and DTOs.

use parkify_core::booking::{BookingStatus, CancelReason};
use parkify_core::pricing::MAX_UNIT_PRICE;
use parkify_core::settlement::Settlement;
use parkify_core::status::StatusId;
use parkify_core::types::{Amount, DbId, Timestamp};
use parkify_core::vehicle::VehicleType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::LifecycleError;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub spot_id: DbId,
    /// Owner of the spot at admission; settlements credit this wallet.
    pub owner_id: DbId,
    pub user_id: DbId,
    pub vehicle_type: String,
    /// Hourly price captured at creation.
    pub unit_price: Amount,
    pub status_id: StatusId,
    pub cancel_reason: Option<String>,
    /// Check-in code, present only while `confirmed`.
    pub otp: Option<String>,
    pub start_time: Option<Timestamp>,
    /// Safety-net deadline after which the sweeper completes the session.
    pub expires_at: Option<Timestamp>,
    /// Actual completion instant.
    pub end_time: Option<Timestamp>,
    pub total_amount: Option<Amount>,
    pub owner_share: Option<Amount>,
    pub commission: Option<Amount>,
    pub payment_reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    /// Decode `status_id`.
    pub fn status(&self) -> Result<BookingStatus, LifecycleError> {
        BookingStatus::from_id(self.status_id).ok_or(LifecycleError::UnknownStatus {
            booking_id: self.id,
            status_id: self.status_id,
        })
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancel_reason.as_deref().and_then(|r| r.parse().ok())
    }

    /// Stored settlement, if the booking has been completed.
    pub fn settlement(&self) -> Option<Settlement> {
        let (start, end) = (self.start_time?, self.end_time?);
        Some(Settlement {
            elapsed_minutes: parkify_core::settlement::elapsed_minutes(start, end),
            total_amount: self.total_amount?,
            owner_share: self.owner_share?,
            commission: self.commission?,
        })
    }
}

/// API representation: the row plus its decoded status name.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub status: Option<BookingStatus>,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        let status = BookingStatus::from_id(booking.status_id);
        Self { booking, status }
    }
}

/// DTO for `POST /api/v1/bookings`.
///
/// `vehicle_type` stays a raw string so a missing or unknown type surfaces
/// as `INVALID_VEHICLE_TYPE` rather than a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBooking {
    #[validate(range(min = 1, message = "spot_id must be a positive id"))]
    pub spot_id: DbId,
    pub vehicle_type: Option<String>,
    #[validate(range(
        min = 0,
        max = MAX_UNIT_PRICE,
        message = "price must be between 0 and 1000000"
    ))]
    pub price: Option<Amount>,
}

/// Validated admission request handed to the repository.
#[derive(Debug, Clone, Copy)]
pub struct NewBooking {
    pub spot_id: DbId,
    pub user_id: DbId,
    pub vehicle_type: VehicleType,
    pub requested_price: Option<Amount>,
}

/// DTO for `POST /api/v1/bookings/{id}/verify-otp`.
#[derive(Debug, Deserialize)]
pub struct VerifyOtp {
    pub otp: String,
}

/// DTO for `POST /api/v1/bookings/{id}/complete`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteBooking {
    #[validate(length(max = 128, message = "payment_reference is too long"))]
    pub payment_reference: Option<String>,
}

/// Owner inbox entry: a booking at one of the owner's spots plus the
/// driver's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OwnerBooking {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub spot_name: String,
    pub driver_name: String,
}

/// Outcome of a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub booking: BookingView,
    pub owner_id: DbId,
    pub settlement: Settlement,
    /// False when the booking had already been completed earlier; nothing
    /// was credited by this call.
    pub newly_completed: bool,
}

/// Position in the expiry queue: an overdue booking's deadline and ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryCursor {
    pub expires_at: Timestamp,
    pub booking_id: DbId,
}

/// Query parameters for booking list endpoints.
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    /// Filter by status ID (e.g. 1 = pending).
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
