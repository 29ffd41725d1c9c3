//! Handlers for spot occupancy.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use parkify_core::booking::BookingError;
use parkify_core::types::DbId;
use parkify_db::repositories::SpotRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/spots/{id}/availability
///
/// Admitted bookings and capacity for every vehicle type at the spot.
pub async fn availability(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(spot_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let spot = SpotRepo::find_by_id(&state.pool, spot_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or(BookingError::SpotNotFound(spot_id))?;

    let availability = SpotRepo::availability(&state.pool, &spot).await?;
    Ok(Json(DataResponse { data: availability }))
}
