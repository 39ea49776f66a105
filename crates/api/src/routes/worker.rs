//! Route definitions for the `/worker` resource.
//!
//! All endpoints require the worker bearer token.

use axum::routing::post;
use axum::Router;

use crate::handlers::worker;
use crate::state::AppState;

/// Routes mounted at `/worker`.
///
/// ```text
/// POST   /run            -> run_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/run", post(worker::run_batch))
}
