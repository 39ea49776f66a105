//! Job entity models for the admin bulk-job queue.

use serde::Serialize;
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A row from the `admin_jobs` table.
///
/// `status` holds one of `pending | claimed | done | failed` (see
/// `warden_core::jobs::JobStatus`). `attempt_count` is incremented inside
/// the claim statement; nothing outside the claim/complete transitions
/// mutates a job row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    /// Account that requested the job (external identity, not a local FK).
    pub actor_user_id: String,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub summary: String,
    pub attempt_count: i32,
    pub max_attempts: i32,
    /// Worker that holds or last held the claim.
    pub worker_id: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields for enqueuing a new job (external submission path).
#[derive(Debug, Clone)]
pub struct NewJob<'a> {
    pub actor_user_id: &'a str,
    pub job_type: &'a str,
    pub payload: &'a serde_json::Value,
    pub summary: &'a str,
}
