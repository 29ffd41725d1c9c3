//! Handlers for the owner's wallet.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use parkify_db::repositories::WalletRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireOwner;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/wallet
///
/// The caller's balance and lifetime earnings. A wallet is created on first
/// access.
pub async fn get_wallet(
    RequireOwner(auth): RequireOwner,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let wallet = WalletRepo::get_or_create(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: wallet }))
}

/// GET /api/v1/wallet/transactions
///
/// Ledger entries, newest first. Supports `limit` and `offset`.
pub async fn list_transactions(
    RequireOwner(auth): RequireOwner,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let entries =
        WalletRepo::list_transactions(&state.pool, auth.user_id, params.limit, params.offset)
            .await?;
    Ok(Json(DataResponse { data: entries }))
}
