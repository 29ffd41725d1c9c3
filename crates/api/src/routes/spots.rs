use axum::routing::get;
use axum::Router;

use crate::handlers::spots;
use crate::state::AppState;

/// Routes mounted at `/spots`.
///
/// ```text
/// GET    /{id}/availability   -> availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/availability", get(spots::availability))
}
