//! Handlers for the `/bookings` resource.
//!
//! All endpoints require authentication. Drivers create, cancel and view
//! their own bookings; the owner of the booked spot confirms, declines and
//! checks the driver in; either side may complete. Admins may act on any
//! booking.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use parkify_core::admission::parse_vehicle_type;
use parkify_core::booking::{BookingError, CancelReason};
use parkify_core::error::CoreError;
use parkify_core::types::DbId;
use parkify_db::models::booking::{
    Booking, BookingListQuery, BookingView, CompleteBooking, CreateBooking, NewBooking, VerifyOtp,
};
use parkify_db::models::spot::ParkingSpot;
use parkify_db::repositories::{BookingRepo, SpotRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireDriver, RequireOwner};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Which side of a booking may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    /// The driver who made the booking.
    Driver,
    /// The owner of the booked spot.
    SpotOwner,
    /// Either of the above.
    Either,
}

/// Fetch a booking and verify the caller may act on it (admins always may).
///
/// Returns `BOOKING_NOT_FOUND` if the booking does not exist, `Forbidden` if
/// the caller is not an allowed party. `action` is used in the error
/// message (e.g. "view", "confirm").
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    booking_id: DbId,
    auth: &AuthUser,
    party: Party,
    action: &str,
) -> AppResult<Booking> {
    let booking = BookingRepo::find_by_id(pool, booking_id)
        .await?
        .ok_or(BookingError::NotFound(booking_id))?;

    if auth.is_admin() {
        return Ok(booking);
    }

    let is_driver = booking.user_id == auth.user_id;
    let is_spot_owner = booking.owner_id == auth.user_id;
    let allowed = match party {
        Party::Driver => is_driver,
        Party::SpotOwner => is_spot_owner,
        Party::Either => is_driver || is_spot_owner,
    };

    if !allowed {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} booking {booking_id}"
        ))));
    }
    Ok(booking)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/bookings
///
/// Request a slot at a spot. Returns 201 with the `pending` booking, or a
/// 4xx with `INVALID_VEHICLE_TYPE`, `SPOT_NOT_FOUND`, `CAPACITY_EXCEEDED`
/// or `USER_ALREADY_BOOKED`.
pub async fn create_booking(
    RequireDriver(auth): RequireDriver,
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> AppResult<impl IntoResponse> {
    let vehicle_type = parse_vehicle_type(input.vehicle_type.as_deref())?;
    input.validate()?;

    let request = NewBooking {
        spot_id: input.spot_id,
        user_id: auth.user_id,
        vehicle_type,
        requested_price: input.price,
    };
    let booking =
        BookingRepo::admit(&state.pool, &request, &state.policy.pricing, Utc::now()).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BookingView::from(booking),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking =
        find_and_authorize(&state.pool, booking_id, &auth, Party::Either, "view").await?;
    Ok(Json(DataResponse {
        data: BookingView::from(booking),
    }))
}

/// The driver's open booking together with the spot it is at.
#[derive(Debug, Serialize)]
pub struct CurrentBooking {
    pub booking: BookingView,
    pub spot: Option<ParkingSpot>,
}

/// GET /api/v1/bookings/current
///
/// The caller's most recent pending, confirmed or active booking, or
/// `null` when there is none.
pub async fn current_booking(
    RequireDriver(auth): RequireDriver,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let current = match BookingRepo::find_current_for_user(&state.pool, auth.user_id).await? {
        Some(booking) => {
            let spot = SpotRepo::find_by_id(&state.pool, booking.spot_id).await?;
            Some(CurrentBooking {
                booking: booking.into(),
                spot,
            })
        }
        None => None,
    };
    Ok(Json(DataResponse { data: current }))
}

/// GET /api/v1/bookings/owner
///
/// Bookings at the caller's spots with driver names, newest first.
/// Supports optional `status_id`, `limit`, and `offset` query parameters.
pub async fn owner_bookings(
    RequireOwner(auth): RequireOwner,
    State(state): State<AppState>,
    Query(params): Query<BookingListQuery>,
) -> AppResult<impl IntoResponse> {
    let bookings = BookingRepo::list_for_owner(&state.pool, auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: bookings }))
}

// ---------------------------------------------------------------------------
// Owner decisions
// ---------------------------------------------------------------------------

/// Response to a confirmation: the code the driver presents on arrival.
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub booking_id: DbId,
    pub otp: String,
}

/// POST /api/v1/bookings/{id}/confirm
pub async fn confirm_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, booking_id, &auth, Party::SpotOwner, "confirm").await?;

    let booking = BookingRepo::confirm(&state.pool, booking_id).await?;
    let otp = booking.otp.ok_or_else(|| {
        AppError::InternalError(format!("Booking {booking_id} confirmed without an OTP"))
    })?;

    Ok(Json(DataResponse {
        data: ConfirmResponse { booking_id, otp },
    }))
}

/// POST /api/v1/bookings/{id}/decline
///
/// Returns 204. Only `pending` or `confirmed` bookings can be declined.
pub async fn decline_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, booking_id, &auth, Party::SpotOwner, "decline").await?;
    BookingRepo::decline(&state.pool, booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/bookings/{id}/verify-otp
///
/// Check the driver in. A wrong code returns 409 `WRONG_OTP` and leaves the
/// booking `confirmed`.
pub async fn verify_otp(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<VerifyOtp>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, booking_id, &auth, Party::SpotOwner, "check in").await?;

    let booking = BookingRepo::activate(
        &state.pool,
        booking_id,
        &input.otp,
        Utc::now(),
        state.policy.max_session,
    )
    .await?;

    Ok(Json(DataResponse {
        data: BookingView::from(booking),
    }))
}

// ---------------------------------------------------------------------------
// Driver / shared actions
// ---------------------------------------------------------------------------

/// POST /api/v1/bookings/{id}/cancel
///
/// Returns 204. Drivers cancel their own bookings; admins may cancel any.
/// No settlement is produced, even for an `active` booking.
pub async fn cancel_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let booking =
        find_and_authorize(&state.pool, booking_id, &auth, Party::Driver, "cancel").await?;

    let reason = if auth.is_admin() && booking.user_id != auth.user_id {
        CancelReason::AdminCancelled
    } else {
        CancelReason::DriverCancelled
    };
    BookingRepo::cancel(&state.pool, booking_id, reason).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/bookings/{id}/complete
///
/// End an `active` session after payment. The body is optional
/// (`{"payment_reference": "..."}`). Completing an already completed
/// booking returns the stored settlement without crediting again.
pub async fn complete_booking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: CompleteBooking = if body.is_empty() {
        CompleteBooking::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };
    input.validate()?;

    find_and_authorize(&state.pool, booking_id, &auth, Party::Either, "complete").await?;

    let completion = BookingRepo::complete(
        &state.pool,
        booking_id,
        Utc::now(),
        &state.policy.settlement,
        input.payment_reference.as_deref(),
    )
    .await?;

    if !completion.newly_completed {
        tracing::debug!(booking_id, "Completion repeated; returning stored settlement");
    }

    Ok(Json(DataResponse { data: completion }))
}
