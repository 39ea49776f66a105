//! The store boundary: everything the worker core asks of the persistent
//! store, behind one trait.

use async_trait::async_trait;
use warden_db::models::job::Job;
use warden_db::models::outbox::OutboxEntry;
use warden_db::repositories::{AdminActionRepo, JobRepo, OutboxRepo};
use warden_db::DbPool;
use warden_core::types::DbId;

/// Error from a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store-reported failure that is not a transport/database error
    /// (used by test doubles and by store procedures that signal refusal).
    #[error("{0}")]
    Backend(String),
}

/// Operations the job core and outbox dispatcher require from the store.
///
/// # Atomicity contract
///
/// `claim_next_job` MUST provide mutual exclusion per job: no two callers,
/// however concurrent, may ever receive the same job row. The Postgres
/// implementation gets this from `FOR UPDATE SKIP LOCKED`; any test double
/// must enforce the same guarantee (the mock in [`crate::testing`] holds a
/// lock across the whole claim transition).
///
/// `complete_job` MUST tolerate repetition: only the first call for a
/// claimed job transitions it, later calls are no-ops. All other writes
/// are last-writer-wins and carry no additional locking.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Atomically claim the oldest pending job for `worker_id`, or return
    /// `None` when the pending queue is empty.
    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<Job>, StoreError>;

    /// Durably record a claimed job's terminal outcome.
    async fn complete_job(
        &self,
        job_id: DbId,
        success: bool,
        error: &str,
    ) -> Result<(), StoreError>;

    /// Force sign-out of the target account's sessions.
    async fn perform_signout(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError>;

    /// Require multi-factor authentication for the target account.
    async fn perform_enforce_mfa(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError>;

    /// Delete the target account.
    async fn perform_delete_account(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError>;

    /// Fetch up to `limit` pending outbox entries, oldest first.
    async fn fetch_pending_notifications(
        &self,
        limit: i64,
    ) -> Result<Vec<OutboxEntry>, StoreError>;

    /// Record a successful delivery: `sent`, attempts updated, error
    /// cleared, sent time stamped.
    async fn mark_notification_sent(&self, id: DbId, attempts: i32) -> Result<(), StoreError>;

    /// Record a failed delivery: `failed`, attempts updated, error kept.
    async fn mark_notification_failed(
        &self,
        id: DbId,
        attempts: i32,
        error: &str,
    ) -> Result<(), StoreError>;
}

/// Production [`AdminStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgAdminStore {
    pool: DbPool,
}

impl PgAdminStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<Job>, StoreError> {
        Ok(JobRepo::claim_next(&self.pool, worker_id).await?)
    }

    async fn complete_job(
        &self,
        job_id: DbId,
        success: bool,
        error: &str,
    ) -> Result<(), StoreError> {
        let transitioned = JobRepo::complete(&self.pool, job_id, success, error).await?;
        if !transitioned {
            // Already terminal: the idempotent no-op case.
            tracing::debug!(job_id, "Completion already recorded");
        }
        Ok(())
    }

    async fn perform_signout(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        Ok(AdminActionRepo::signout_user(&self.pool, target_user_id, actor_user_id).await?)
    }

    async fn perform_enforce_mfa(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        Ok(AdminActionRepo::enforce_mfa(&self.pool, target_user_id, actor_user_id).await?)
    }

    async fn perform_delete_account(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        Ok(AdminActionRepo::delete_account(&self.pool, target_user_id, actor_user_id).await?)
    }

    async fn fetch_pending_notifications(
        &self,
        limit: i64,
    ) -> Result<Vec<OutboxEntry>, StoreError> {
        Ok(OutboxRepo::fetch_pending(&self.pool, limit).await?)
    }

    async fn mark_notification_sent(&self, id: DbId, attempts: i32) -> Result<(), StoreError> {
        Ok(OutboxRepo::mark_sent(&self.pool, id, attempts).await?)
    }

    async fn mark_notification_failed(
        &self,
        id: DbId,
        attempts: i32,
        error: &str,
    ) -> Result<(), StoreError> {
        Ok(OutboxRepo::mark_failed(&self.pool, id, attempts, error).await?)
    }
}
