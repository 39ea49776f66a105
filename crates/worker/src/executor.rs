//! Per-job execution: resolve the target set, dispatch by job type, fan
//! out over targets in order, fail fast on the first downstream error.

use serde::Serialize;
use warden_core::jobs::{resolve_targets, JobAction};
use warden_db::models::job::Job;

use crate::store::{AdminStore, StoreError};

/// Why a job's execution failed. The `Display` strings are the
/// machine-readable error codes recorded on the job and surfaced in the
/// batch response.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The payload resolved to no target accounts.
    #[error("missing_target_user_ids")]
    MissingTargets,

    /// The job type is outside the recognized action set.
    #[error("unsupported_job_type:{0}")]
    UnsupportedJobType(String),

    /// A downstream admin action failed; the message is the store's.
    #[error("{0}")]
    Action(StoreError),
}

/// Outcome of one admin action against one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutcome {
    pub target_user_id: String,
    pub action: &'static str,
    pub response: serde_json::Value,
}

/// Aggregate result of a job's execution. Embedded in the batch
/// response; never persisted on its own.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub target_count: usize,
    pub results: Vec<TargetOutcome>,
}

/// Execute one claimed job against the store.
///
/// Targets are acted on in payload order, each exactly once. The first
/// downstream failure aborts the job: no further targets are attempted
/// and the whole job is reported failed, even though earlier target
/// actions have already taken effect downstream.
pub async fn execute_job(
    store: &dyn AdminStore,
    job: &Job,
) -> Result<ExecutionReport, ExecutionError> {
    let targets = resolve_targets(&job.payload);
    if targets.is_empty() {
        return Err(ExecutionError::MissingTargets);
    }

    let action = JobAction::parse(&job.job_type)
        .ok_or_else(|| ExecutionError::UnsupportedJobType(job.job_type.clone()))?;

    let mut results = Vec::with_capacity(targets.len());
    for target in &targets {
        let response = match action {
            JobAction::SignoutUser => store.perform_signout(target, &job.actor_user_id).await,
            JobAction::EnforceMfa => store.perform_enforce_mfa(target, &job.actor_user_id).await,
            JobAction::DeleteAccount => {
                store.perform_delete_account(target, &job.actor_user_id).await
            }
        }
        .map_err(ExecutionError::Action)?;

        results.push(TargetOutcome {
            target_user_id: target.clone(),
            action: action.as_str(),
            response,
        });
    }

    Ok(ExecutionReport {
        target_count: targets.len(),
        results,
    })
}
