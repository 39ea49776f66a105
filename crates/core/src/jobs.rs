//! Job vocabulary: the recognized admin actions, job lifecycle statuses,
//! and target-set resolution from job payloads.

use serde::{Deserialize, Serialize};

/// Payload field naming a single target account. Takes precedence over
/// [`TARGET_LIST_FIELD`] when both are present.
pub const TARGET_FIELD: &str = "target_user_id";

/// Payload field naming a list of target accounts.
pub const TARGET_LIST_FIELD: &str = "target_user_ids";

// ---------------------------------------------------------------------------
// Job actions
// ---------------------------------------------------------------------------

/// The fixed set of administrative actions a job may perform.
///
/// Anything outside this set is rejected by the executor with
/// `unsupported_job_type:<type>` before any downstream call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    /// Force sign-out of all active sessions for the target account.
    SignoutUser,
    /// Require multi-factor authentication on next login.
    EnforceMfa,
    /// Delete the target account.
    DeleteAccount,
}

impl JobAction {
    /// Parse a raw `job_type` string. Returns `None` for unrecognized types.
    pub fn parse(job_type: &str) -> Option<Self> {
        match job_type {
            "signout_user" => Some(Self::SignoutUser),
            "enforce_mfa" => Some(Self::EnforceMfa),
            "delete_account" => Some(Self::DeleteAccount),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignoutUser => "signout_user",
            Self::EnforceMfa => "enforce_mfa",
            Self::DeleteAccount => "delete_account",
        }
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job statuses
// ---------------------------------------------------------------------------

/// Job lifecycle states, stored as text in `admin_jobs.status`.
///
/// `pending → claimed → done | failed`. At most one worker holds a job in
/// `claimed` at any time; the terminal transition happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Claimed,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

// ---------------------------------------------------------------------------
// Target resolution
// ---------------------------------------------------------------------------

/// Resolve the target account identifiers a job acts upon.
///
/// `target_user_id` (single) takes precedence over `target_user_ids`
/// (list) when both are present. Values are trimmed; empty strings and
/// non-string list elements are dropped. An empty return is a terminal
/// execution error for the caller, never a no-op.
pub fn resolve_targets(payload: &serde_json::Value) -> Vec<String> {
    if let Some(single) = payload.get(TARGET_FIELD).and_then(as_trimmed_str) {
        return vec![single];
    }

    payload
        .get(TARGET_LIST_FIELD)
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(as_trimmed_str).collect())
        .unwrap_or_default()
}

fn as_trimmed_str(value: &serde_json::Value) -> Option<String> {
    let trimmed = value.as_str()?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
