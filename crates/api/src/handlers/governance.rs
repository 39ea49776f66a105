//! Handler for the governance maintenance endpoint.
//!
//! One POST runs the fixed maintenance sequence over the approval and
//! impersonation tables, queues SLA escalation alerts into the outbox,
//! and then dispatches pending outbox entries. Any maintenance step
//! failing aborts the pass with a 500 naming the step; delivery failures
//! during dispatch are per-entry and yield a 207.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use warden_core::limits::{
    clamp_dispatch_limit, clamp_or, DEFAULT_OVERDUE_APPROVAL_HOURS, DEFAULT_SLA_HOURS,
    DEFAULT_STALE_APPROVAL_HOURS, MAX_APPROVAL_WINDOW_HOURS, MAX_SLA_HOURS,
};
use warden_core::outbox::CHANNEL_WEBHOOK;
use warden_core::types::Timestamp;
use warden_db::repositories::GovernanceRepo;
use warden_worker::{DispatchReport, OutboxDispatcher};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::WorkerAuth;
use crate::state::AppState;

/// Request body for a governance pass. All fields are optional; an empty
/// or absent body runs with the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceRequest {
    /// Age in hours after which a pending approval expires (clamped to
    /// `[1, 2160]`, default 72).
    pub stale_approval_hours: Option<i64>,
    /// Age in hours after which a pending approval is overdue (clamped to
    /// `[1, 2160]`, default 24).
    pub overdue_approval_hours: Option<i64>,
    /// SLA window in hours for newly assigned approvals (clamped to
    /// `[1, 720]`, default 24).
    pub sla_hours: Option<i64>,
    /// Channel recorded on queued escalation notifications (default
    /// `webhook`).
    pub escalation_channel: Option<String>,
    /// Upper bound on outbox entries dispatched this pass (clamped to
    /// `[1, 200]`, default 50).
    pub dispatch_limit: Option<i64>,
}

/// Response body for a governance pass: the effective inputs, each
/// maintenance step's row count, and the dispatch report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceReport {
    pub ok: bool,
    pub stale_approval_hours: i64,
    pub overdue_approval_hours: i64,
    pub sla_hours: i64,
    pub escalation_channel: String,
    pub assigned_approval_owners: i64,
    pub expired_approvals: i64,
    pub expired_impersonation_sessions: i64,
    pub created_overdue_alerts: i64,
    pub queued_escalations: i64,
    pub dispatch: DispatchReport,
    pub run_at: Timestamp,
}

fn step_error(step: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::MaintenanceStep {
        step,
        detail: e.to_string(),
    }
}

/// POST /governance/run
///
/// Run the maintenance sequence, then dispatch the outbox.
pub async fn run_pass(
    State(state): State<AppState>,
    _auth: WorkerAuth,
    body: Option<Json<GovernanceRequest>>,
) -> AppResult<Response> {
    let request = body.map(|Json(b)| b).unwrap_or_default();

    let stale_hours = clamp_or(
        request.stale_approval_hours,
        1,
        MAX_APPROVAL_WINDOW_HOURS,
        DEFAULT_STALE_APPROVAL_HOURS,
    );
    let overdue_hours = clamp_or(
        request.overdue_approval_hours,
        1,
        MAX_APPROVAL_WINDOW_HOURS,
        DEFAULT_OVERDUE_APPROVAL_HOURS,
    );
    let sla_hours = clamp_or(request.sla_hours, 1, MAX_SLA_HOURS, DEFAULT_SLA_HOURS);
    let dispatch_limit = clamp_dispatch_limit(request.dispatch_limit);
    // Channels are stored lowercase; the dispatcher matches them
    // case-insensitively but persisted rows stay canonical.
    let channel = request
        .escalation_channel
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| CHANNEL_WEBHOOK.to_string());

    tracing::info!(
        stale_hours,
        overdue_hours,
        sla_hours,
        dispatch_limit,
        channel = %channel,
        "Starting governance pass",
    );

    // The maintenance steps run in a fixed order so later steps observe
    // the earlier ones' writes (escalations are queued only for approvals
    // already flagged overdue).
    let assigned = GovernanceRepo::assign_approval_owners(&state.pool, sla_hours)
        .await
        .map_err(step_error("assign_approval_owners"))?;

    let expired = GovernanceRepo::expire_stale_approvals(&state.pool, stale_hours)
        .await
        .map_err(step_error("expire_stale_approvals"))?;

    let expired_sessions = GovernanceRepo::expire_impersonation_sessions(&state.pool)
        .await
        .map_err(step_error("expire_impersonation_sessions"))?;

    let overdue = GovernanceRepo::raise_overdue_alerts(&state.pool, overdue_hours)
        .await
        .map_err(step_error("raise_overdue_alerts"))?;

    let queued = GovernanceRepo::enqueue_sla_escalations(&state.pool, overdue_hours, &channel)
        .await
        .map_err(step_error("enqueue_sla_escalations"))?;

    let dispatcher = OutboxDispatcher::new(Arc::clone(&state.store), Arc::clone(&state.webhook));
    let dispatch = dispatcher
        .dispatch_pending(Some(dispatch_limit))
        .await
        .map_err(|e| AppError::MaintenanceStep {
            step: "dispatch_pending",
            detail: e.to_string(),
        })?;

    let ok = dispatch.failed_count == 0;
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    let report = GovernanceReport {
        ok,
        stale_approval_hours: stale_hours,
        overdue_approval_hours: overdue_hours,
        sla_hours,
        escalation_channel: channel,
        assigned_approval_owners: assigned,
        expired_approvals: expired,
        expired_impersonation_sessions: expired_sessions,
        created_overdue_alerts: overdue,
        queued_escalations: queued,
        dispatch,
        run_at: Utc::now(),
    };

    Ok((status, Json(report)).into_response())
}
