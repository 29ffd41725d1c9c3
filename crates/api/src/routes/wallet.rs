use axum::routing::get;
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallet`. Owner only.
///
/// ```text
/// GET    /                -> get_wallet
/// GET    /transactions    -> list_transactions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(wallet::get_wallet))
        .route("/transactions", get(wallet::list_transactions))
}
