//! Notification outbox entity models.

use serde::Serialize;
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A row from the `admin_notification_outbox` table.
///
/// Alerts are written here durably by store-side policy (SLA escalation
/// enqueue) and delivered by the outbox dispatcher, which records the
/// outcome back onto the row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutboxEntry {
    pub id: DbId,
    pub channel: String,
    /// Endpoint address; for the `webhook` channel, a URL.
    pub destination: String,
    pub subject: String,
    pub body: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Fields for queuing a new outbox entry.
#[derive(Debug, Clone)]
pub struct NewOutboxEntry<'a> {
    pub channel: &'a str,
    pub destination: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub payload: &'a serde_json::Value,
}
