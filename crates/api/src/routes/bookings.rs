//! Route definitions for the `/bookings` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// POST   /                  -> create_booking
/// GET    /current           -> current_booking
/// GET    /owner             -> owner_bookings
/// GET    /{id}              -> get_booking
/// POST   /{id}/confirm      -> confirm_booking
/// POST   /{id}/decline      -> decline_booking
/// POST   /{id}/cancel       -> cancel_booking
/// POST   /{id}/verify-otp   -> verify_otp
/// POST   /{id}/complete     -> complete_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create_booking))
        .route("/current", get(bookings::current_booking))
        .route("/owner", get(bookings::owner_bookings))
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/confirm", post(bookings::confirm_booking))
        .route("/{id}/decline", post(bookings::decline_booking))
        .route("/{id}/cancel", post(bookings::cancel_booking))
        .route("/{id}/verify-otp", post(bookings::verify_otp))
        .route("/{id}/complete", post(bookings::complete_booking))
}
