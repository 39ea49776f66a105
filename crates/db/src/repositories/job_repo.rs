//! Repository for the `admin_jobs` table.
//!
//! The claim is the only place mutual exclusion matters: `claim_next` uses
//! `SELECT ... FOR UPDATE SKIP LOCKED` inside a single UPDATE so that two
//! concurrently running workers can never receive the same job row.

use sqlx::PgPool;
use warden_core::jobs::JobStatus;
use warden_core::types::DbId;

use crate::models::job::{Job, NewJob};

/// Column list for `admin_jobs` queries.
const COLUMNS: &str = "\
    id, actor_user_id, job_type, payload, status, summary, \
    attempt_count, max_attempts, worker_id, \
    claimed_at, completed_at, last_error, created_at, updated_at";

/// Provides the claim/complete transitions and supporting queries for
/// admin bulk jobs.
pub struct JobRepo;

impl JobRepo {
    /// Enqueue a new pending job (the external submission path).
    pub async fn enqueue(pool: &PgPool, input: &NewJob<'_>) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_jobs (actor_user_id, job_type, payload, summary) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(input.actor_user_id)
            .bind(input.job_type)
            .bind(input.payload)
            .bind(input.summary)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest pending job for a worker.
    ///
    /// Flips `pending → claimed`, attributes the worker, stamps
    /// `claimed_at`, and increments `attempt_count` in one statement.
    /// `FOR UPDATE SKIP LOCKED` guarantees no two callers receive the
    /// same row, even under concurrent invocations.
    pub async fn claim_next(
        pool: &PgPool,
        worker_id: &str,
    ) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE admin_jobs \
             SET status = $1, worker_id = $2, claimed_at = NOW(), \
                 attempt_count = attempt_count + 1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM admin_jobs \
                 WHERE status = $3 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Claimed.as_str())
            .bind(worker_id)
            .bind(JobStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record a job's terminal outcome.
    ///
    /// Only a `claimed` row transitions, so a repeated call for the same
    /// job id is a no-op — the store tolerates double completion without
    /// corrupting state. Returns `true` if this call performed the
    /// transition.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        success: bool,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let terminal = if success {
            JobStatus::Done
        } else {
            JobStatus::Failed
        };
        let result = sqlx::query(
            "UPDATE admin_jobs \
             SET status = $2, completed_at = NOW(), \
                 last_error = NULLIF($3, ''), updated_at = NOW() \
             WHERE id = $1 AND status = $4",
        )
        .bind(job_id)
        .bind(terminal.as_str())
        .bind(error)
        .bind(JobStatus::Claimed.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
