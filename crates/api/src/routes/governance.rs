//! Route definitions for the `/governance` resource.
//!
//! All endpoints require the worker bearer token.

use axum::routing::post;
use axum::Router;

use crate::handlers::governance;
use crate::state::AppState;

/// Routes mounted at `/governance`.
///
/// ```text
/// POST   /run            -> run_pass
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/run", post(governance::run_pass))
}
