//! Handler for the batch worker endpoint.
//!
//! One POST drains one bounded batch of pending admin jobs. The response
//! status distinguishes a clean run (200) from a run where some jobs
//! failed (207) and from a run the store aborted mid-way (500, with the
//! partial progress in the body).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use warden_worker::BatchRunner;

use crate::middleware::auth::WorkerAuth;
use crate::state::AppState;

/// Request body for a batch run. Both fields are optional; an empty or
/// absent body runs with the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBatchRequest {
    /// Upper bound on jobs drained this invocation (clamped to `[1, 100]`,
    /// default 20).
    pub max_jobs: Option<i64>,
    /// Identifier recorded on every job this invocation claims.
    pub worker_id: Option<String>,
}

/// POST /worker/run
///
/// Claim and execute up to `maxJobs` pending jobs.
pub async fn run_batch(
    State(state): State<AppState>,
    _auth: WorkerAuth,
    body: Option<Json<RunBatchRequest>>,
) -> Response {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let worker_id = request
        .worker_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| state.config.default_worker_id.clone());

    let runner = BatchRunner::new(Arc::clone(&state.store));
    match runner.run(request.max_jobs, &worker_id).await {
        Ok(report) => {
            let status = if report.ok {
                StatusCode::OK
            } else {
                StatusCode::MULTI_STATUS
            };
            (status, Json(report)).into_response()
        }
        Err(aborted) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "claim_failed",
                "detail": aborted.error.to_string(),
                "workerId": aborted.worker_id,
                "executed": aborted.executed,
                "failed": aborted.failed,
            })),
        )
            .into_response(),
    }
}
