//! In-memory test doubles for the store boundary and the webhook sender.
//!
//! [`MockStore`] honors the [`AdminStore`](crate::AdminStore) atomicity
//! contract: the whole claim transition happens under one lock, so two
//! concurrent claimers can never receive the same job — which is exactly
//! what the concurrency tests verify against it. Used by this crate's
//! integration tests and by the API crate's router tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use warden_core::jobs::JobStatus;
use warden_core::outbox::OutboxStatus;
use warden_core::types::DbId;
use warden_db::models::job::Job;
use warden_db::models::outbox::OutboxEntry;

use crate::store::{AdminStore, StoreError};
use crate::webhook::{WebhookError, WebhookSender};

/// Build a pending job row for tests.
pub fn pending_job(id: DbId, job_type: &str, payload: serde_json::Value) -> Job {
    let now = Utc::now();
    Job {
        id,
        actor_user_id: "admin-1".to_string(),
        job_type: job_type.to_string(),
        payload,
        status: JobStatus::Pending.as_str().to_string(),
        summary: String::new(),
        attempt_count: 0,
        max_attempts: 3,
        worker_id: None,
        claimed_at: None,
        completed_at: None,
        last_error: None,
        created_at: now,
        updated_at: now,
    }
}

/// Build a pending outbox entry for tests.
pub fn pending_entry(id: DbId, channel: &str, destination: &str) -> OutboxEntry {
    OutboxEntry {
        id,
        channel: channel.to_string(),
        destination: destination.to_string(),
        subject: format!("alert {id}"),
        body: "escalation".to_string(),
        payload: serde_json::json!({ "entry": id }),
        status: OutboxStatus::Pending.as_str().to_string(),
        attempts: 0,
        last_error: None,
        sent_at: None,
        created_at: Utc::now(),
    }
}

/// A recorded downstream admin action call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub action: String,
    pub target_user_id: String,
    pub actor_user_id: String,
}

/// A recorded completion call.
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub job_id: DbId,
    pub success: bool,
    pub error: String,
}

#[derive(Default)]
struct MockState {
    jobs: Vec<Job>,
    outbox: Vec<OutboxEntry>,
    actions: Vec<ActionCall>,
    completions: Vec<CompletionCall>,
}

/// In-memory [`AdminStore`] with scriptable failures.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
    /// `(claims_left_before_failure, message)`.
    claim_failure: Mutex<Option<(u32, String)>>,
    failing_targets: Mutex<HashSet<String>>,
    fail_completions: Mutex<bool>,
    fail_outbox_fetch: Mutex<bool>,
    fail_outbox_updates: Mutex<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().jobs = jobs;
        store
    }

    pub fn with_outbox(entries: Vec<OutboxEntry>) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().outbox = entries;
        store
    }

    /// Make every claim call fail with `message`.
    pub fn fail_claims(&self, message: &str) {
        self.fail_claims_after(0, message);
    }

    /// Let `successes` claim calls through, then fail the rest with
    /// `message`.
    pub fn fail_claims_after(&self, successes: u32, message: &str) {
        *self.claim_failure.lock().unwrap() = Some((successes, message.to_string()));
    }

    /// Make downstream actions against `target` fail.
    pub fn fail_target(&self, target: &str) {
        self.failing_targets.lock().unwrap().insert(target.to_string());
    }

    /// Make completion recording fail.
    pub fn fail_completions(&self) {
        *self.fail_completions.lock().unwrap() = true;
    }

    /// Make the pending-outbox poll fail.
    pub fn fail_outbox_fetch(&self) {
        *self.fail_outbox_fetch.lock().unwrap() = true;
    }

    /// Make outbox status updates fail.
    pub fn fail_outbox_updates(&self) {
        *self.fail_outbox_updates.lock().unwrap() = true;
    }

    pub fn actions(&self) -> Vec<ActionCall> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn completions(&self) -> Vec<CompletionCall> {
        self.state.lock().unwrap().completions.clone()
    }

    pub fn job(&self, id: DbId) -> Option<Job> {
        self.state.lock().unwrap().jobs.iter().find(|j| j.id == id).cloned()
    }

    pub fn outbox_entry(&self, id: DbId) -> Option<OutboxEntry> {
        self.state
            .lock()
            .unwrap()
            .outbox
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    fn perform(
        &self,
        action: &str,
        target: &str,
        actor: &str,
    ) -> Result<serde_json::Value, StoreError> {
        if self.failing_targets.lock().unwrap().contains(target) {
            return Err(StoreError::Backend(format!("store_rejected:{target}")));
        }
        self.state.lock().unwrap().actions.push(ActionCall {
            action: action.to_string(),
            target_user_id: target.to_string(),
            actor_user_id: actor.to_string(),
        });
        Ok(serde_json::json!({ "target_user_id": target, "ok": true }))
    }
}

#[async_trait]
impl AdminStore for MockStore {
    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<Job>, StoreError> {
        if let Some((left, message)) = self.claim_failure.lock().unwrap().as_mut() {
            if *left == 0 {
                return Err(StoreError::Backend(message.clone()));
            }
            *left -= 1;
        }

        // The whole pending→claimed transition happens under this lock:
        // that is the mutual-exclusion guarantee the contract demands.
        let mut state = self.state.lock().unwrap();
        let pending = state
            .jobs
            .iter_mut()
            .find(|j| j.status == JobStatus::Pending.as_str());
        Ok(pending.map(|job| {
            job.status = JobStatus::Claimed.as_str().to_string();
            job.worker_id = Some(worker_id.to_string());
            job.claimed_at = Some(Utc::now());
            job.attempt_count += 1;
            job.clone()
        }))
    }

    async fn complete_job(
        &self,
        job_id: DbId,
        success: bool,
        error: &str,
    ) -> Result<(), StoreError> {
        if *self.fail_completions.lock().unwrap() {
            return Err(StoreError::Backend("complete_unavailable".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        state.completions.push(CompletionCall {
            job_id,
            success,
            error: error.to_string(),
        });

        // Idempotent: only a claimed row transitions.
        if let Some(job) = state
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id && j.status == JobStatus::Claimed.as_str())
        {
            job.status = if success {
                JobStatus::Done.as_str().to_string()
            } else {
                JobStatus::Failed.as_str().to_string()
            };
            job.completed_at = Some(Utc::now());
            job.last_error = if error.is_empty() {
                None
            } else {
                Some(error.to_string())
            };
        }
        Ok(())
    }

    async fn perform_signout(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        self.perform("signout_user", target_user_id, actor_user_id)
    }

    async fn perform_enforce_mfa(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        self.perform("enforce_mfa", target_user_id, actor_user_id)
    }

    async fn perform_delete_account(
        &self,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        self.perform("delete_account", target_user_id, actor_user_id)
    }

    async fn fetch_pending_notifications(
        &self,
        limit: i64,
    ) -> Result<Vec<OutboxEntry>, StoreError> {
        if *self.fail_outbox_fetch.lock().unwrap() {
            return Err(StoreError::Backend("fetch_outbox_failed".to_string()));
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .outbox
            .iter()
            .filter(|e| e.status == OutboxStatus::Pending.as_str())
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_notification_sent(&self, id: DbId, attempts: i32) -> Result<(), StoreError> {
        if *self.fail_outbox_updates.lock().unwrap() {
            return Err(StoreError::Backend("outbox_unavailable".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.outbox.iter_mut().find(|e| e.id == id) {
            entry.status = OutboxStatus::Sent.as_str().to_string();
            entry.attempts = attempts;
            entry.last_error = None;
            entry.sent_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn mark_notification_failed(
        &self,
        id: DbId,
        attempts: i32,
        error: &str,
    ) -> Result<(), StoreError> {
        if *self.fail_outbox_updates.lock().unwrap() {
            return Err(StoreError::Backend("outbox_unavailable".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.outbox.iter_mut().find(|e| e.id == id) {
            entry.status = OutboxStatus::Failed.as_str().to_string();
            entry.attempts = attempts;
            entry.last_error = Some(error.to_string());
        }
        Ok(())
    }
}

/// Records webhook POSTs; individual destinations can be scripted to
/// answer with a non-2xx status or a transport failure.
#[derive(Default)]
pub struct MockWebhook {
    requests: Mutex<Vec<(String, serde_json::Value)>>,
    status_overrides: Mutex<HashMap<String, u16>>,
}

impl MockWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer deliveries to `url` with the given HTTP status.
    pub fn respond_with(&self, url: &str, status: u16) {
        self.status_overrides
            .lock()
            .unwrap()
            .insert(url.to_string(), status);
    }

    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookSender for MockWebhook {
    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), WebhookError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));

        let status = self
            .status_overrides
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(200);
        if !(200..300).contains(&status) {
            return Err(WebhookError::Status(status));
        }
        Ok(())
    }
}
