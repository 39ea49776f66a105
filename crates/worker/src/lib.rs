//! The job-processing core: atomic claim, isolated per-job execution,
//! idempotent completion recording, bounded batch draining, and the
//! notification outbox dispatch loop.
//!
//! All store access goes through the [`AdminStore`] trait so the batch and
//! outbox logic can be exercised against an in-memory store in tests (see
//! [`testing`]). Concurrency safety across overlapping invocations rests
//! entirely on the store's claim operation; within one invocation the
//! pipeline is strictly sequential.

pub mod batch;
pub mod executor;
pub mod outbox;
pub mod store;
pub mod testing;
pub mod webhook;

pub use batch::{BatchAborted, BatchReport, BatchRunner};
pub use executor::{execute_job, ExecutionError, ExecutionReport};
pub use outbox::{DispatchReport, OutboxDispatcher};
pub use store::{AdminStore, PgAdminStore, StoreError};
pub use webhook::{HttpWebhookSender, WebhookError, WebhookSender};
