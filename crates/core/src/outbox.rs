//! Notification outbox vocabulary.

use serde::{Deserialize, Serialize};

/// The only delivery channel the dispatcher currently supports. Entries
/// queued on any other channel fail with `unsupported_channel:<channel>`
/// without a network call.
pub const CHANNEL_WEBHOOK: &str = "webhook";

/// Outbox entry states, stored as text in `admin_notification_outbox.status`.
///
/// `pending` entries are eligible for delivery on every dispatch pass.
/// `sent` is terminal. `failed` entries stay failed until an operator
/// resets them to `pending`; the dispatcher never re-selects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}
