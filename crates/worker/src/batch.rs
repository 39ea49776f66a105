//! The batch controller: bounded claim → execute → complete cycles with
//! partial-failure tolerance.

use serde::Serialize;
use warden_core::limits::clamp_max_jobs;
use warden_core::types::DbId;

use std::sync::Arc;

use crate::executor::{execute_job, ExecutionReport};
use crate::store::{AdminStore, StoreError};

/// A job that executed successfully in this batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutedJob {
    pub job_id: DbId,
    pub job_type: String,
    pub status: &'static str,
    pub result: ExecutionReport,
}

/// A job that failed in this batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedJob {
    pub job_id: DbId,
    pub job_type: String,
    pub status: &'static str,
    pub error: String,
    /// Secondary failure: the completion recording itself failed. Never
    /// changes the executed/failed classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_error: Option<String>,
}

/// Summary of one batch invocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// True only if no job failed.
    pub ok: bool,
    pub worker_id: String,
    pub max_jobs: i64,
    pub executed_count: usize,
    pub failed_count: usize,
    pub executed: Vec<ExecutedJob>,
    pub failed: Vec<FailedJob>,
}

/// A claim call failed: the whole invocation aborts, carrying whatever
/// partial progress was made before the failure.
#[derive(Debug)]
pub struct BatchAborted {
    pub error: StoreError,
    pub worker_id: String,
    pub executed: Vec<ExecutedJob>,
    pub failed: Vec<FailedJob>,
}

/// Drains the job queue in bounded, strictly sequential batches.
pub struct BatchRunner {
    store: Arc<dyn AdminStore>,
}

impl BatchRunner {
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self { store }
    }

    /// Run one batch: at most `max_jobs` (clamped to `[1, 100]`, default
    /// 20) claim attempts, stopping early on the first empty claim.
    ///
    /// Each iteration claims exactly one job, executes it, and records
    /// completion on every exit path. Per-job failures land in the
    /// `failed` list and the loop continues; only a claim failure aborts
    /// the invocation.
    pub async fn run(
        &self,
        max_jobs: Option<i64>,
        worker_id: &str,
    ) -> Result<BatchReport, BatchAborted> {
        let max_jobs = clamp_max_jobs(max_jobs);
        let mut executed: Vec<ExecutedJob> = Vec::new();
        let mut failed: Vec<FailedJob> = Vec::new();

        for _ in 0..max_jobs {
            let job = match self.store.claim_next_job(worker_id).await {
                Ok(Some(job)) => job,
                Ok(None) => break,
                Err(error) => {
                    tracing::error!(worker_id, error = %error, "Job claim failed, aborting batch");
                    return Err(BatchAborted {
                        error,
                        worker_id: worker_id.to_string(),
                        executed,
                        failed,
                    });
                }
            };

            tracing::info!(
                job_id = job.id,
                job_type = %job.job_type,
                worker_id,
                "Job claimed",
            );

            let outcome = execute_job(self.store.as_ref(), &job).await;
            let (success, error_message) = match &outcome {
                Ok(_) => (true, String::new()),
                Err(e) => (false, e.to_string()),
            };

            // Completion is recorded on every exit path. Its own failure
            // is a secondary note; it never reclassifies the job.
            let completion_error = match self
                .store
                .complete_job(job.id, success, &error_message)
                .await
            {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(job_id = job.id, error = %e, "Completion recording failed");
                    Some(e.to_string())
                }
            };

            match outcome {
                Ok(result) => {
                    tracing::info!(job_id = job.id, targets = result.target_count, "Job done");
                    executed.push(ExecutedJob {
                        job_id: job.id,
                        job_type: job.job_type,
                        status: "done",
                        result,
                    });
                }
                Err(e) => {
                    tracing::warn!(job_id = job.id, error = %e, "Job failed");
                    failed.push(FailedJob {
                        job_id: job.id,
                        job_type: job.job_type,
                        status: "failed",
                        error: e.to_string(),
                        completion_error,
                    });
                }
            }
        }

        Ok(BatchReport {
            ok: failed.is_empty(),
            worker_id: worker_id.to_string(),
            max_jobs,
            executed_count: executed.len(),
            failed_count: failed.len(),
            executed,
            failed,
        })
    }
}
