pub mod bookings;
pub mod health;
pub mod spots;
pub mod wallet;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /bookings                          create (driver)
/// /bookings/current                  caller's open booking (driver)
/// /bookings/owner                    owner inbox (owner)
/// /bookings/{id}                     get
/// /bookings/{id}/confirm             confirm, returns OTP (spot owner)
/// /bookings/{id}/decline             decline (spot owner)
/// /bookings/{id}/cancel              cancel (driver, admin)
/// /bookings/{id}/verify-otp          check in (spot owner)
/// /bookings/{id}/complete            complete and settle (driver, spot owner)
///
/// /spots/{id}/availability           per-vehicle occupancy
///
/// /wallet                            balance (owner)
/// /wallet/transactions               ledger (owner)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/bookings", bookings::router())
        .nest("/spots", spots::router())
        .nest("/wallet", wallet::router())
}
