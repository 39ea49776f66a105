//! Request-bound constants and clamp helpers.
//!
//! This module lives in `core` (zero internal deps) so the same bounds are
//! applied by the API layer and by direct callers of the worker crate.

// ---------------------------------------------------------------------------
// Batch job processing
// ---------------------------------------------------------------------------

/// Default number of jobs drained per batch invocation.
pub const DEFAULT_MAX_JOBS: i64 = 20;

/// Minimum jobs per batch invocation.
pub const MIN_MAX_JOBS: i64 = 1;

/// Maximum jobs per batch invocation.
pub const MAX_MAX_JOBS: i64 = 100;

// ---------------------------------------------------------------------------
// Outbox dispatch
// ---------------------------------------------------------------------------

/// Default number of pending outbox entries polled per dispatch pass.
pub const DEFAULT_DISPATCH_LIMIT: i64 = 50;

/// Minimum entries per dispatch pass.
pub const MIN_DISPATCH_LIMIT: i64 = 1;

/// Maximum entries per dispatch pass.
pub const MAX_DISPATCH_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Governance windows (hours)
// ---------------------------------------------------------------------------

/// Default age after which an unanswered approval request expires.
pub const DEFAULT_STALE_APPROVAL_HOURS: i64 = 72;

/// Default age after which a pending approval raises an overdue alert.
pub const DEFAULT_OVERDUE_APPROVAL_HOURS: i64 = 24;

/// Default SLA window for approval-owner assignment.
pub const DEFAULT_SLA_HOURS: i64 = 24;

/// Upper bound for the stale/overdue windows (90 days).
pub const MAX_APPROVAL_WINDOW_HOURS: i64 = 24 * 90;

/// Upper bound for the SLA window (30 days).
pub const MAX_SLA_HOURS: i64 = 24 * 30;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Clamp an optional request value into `[min, max]`, falling back to
/// `default` when absent.
pub fn clamp_or(value: Option<i64>, min: i64, max: i64, default: i64) -> i64 {
    value.unwrap_or(default).clamp(min, max)
}

/// Clamp a `maxJobs` request value to `[1, 100]`, default 20.
pub fn clamp_max_jobs(value: Option<i64>) -> i64 {
    clamp_or(value, MIN_MAX_JOBS, MAX_MAX_JOBS, DEFAULT_MAX_JOBS)
}

/// Clamp a `dispatchLimit` request value to `[1, 200]`, default 50.
pub fn clamp_dispatch_limit(value: Option<i64>) -> i64 {
    clamp_or(value, MIN_DISPATCH_LIMIT, MAX_DISPATCH_LIMIT, DEFAULT_DISPATCH_LIMIT)
}
