pub mod governance;
pub mod health;
pub mod worker;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /worker/run          run one batch of admin jobs (POST, bearer token)
/// /governance/run      run one governance maintenance pass (POST, bearer token)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/worker", worker::router())
        .nest("/governance", governance::router())
}
