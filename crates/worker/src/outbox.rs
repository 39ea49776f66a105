//! The outbox dispatcher: poll pending notifications, deliver over HTTP,
//! record per-entry outcomes.

use serde::Serialize;
use warden_core::limits::clamp_dispatch_limit;
use warden_core::outbox::CHANNEL_WEBHOOK;
use warden_core::types::DbId;
use warden_db::models::outbox::OutboxEntry;

use std::sync::Arc;

use crate::store::{AdminStore, StoreError};
use crate::webhook::WebhookSender;

/// A delivery that failed in this pass.
#[derive(Debug, Serialize)]
pub struct FailedDelivery {
    pub id: DbId,
    pub error: String,
}

/// Summary of one dispatch pass. `sent_count + failed_count == polled`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub polled: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub failed: Vec<FailedDelivery>,
}

/// Delivers queued alerts and records each outcome on the outbox row.
pub struct OutboxDispatcher {
    store: Arc<dyn AdminStore>,
    sender: Arc<dyn WebhookSender>,
}

impl OutboxDispatcher {
    pub fn new(store: Arc<dyn AdminStore>, sender: Arc<dyn WebhookSender>) -> Self {
        Self { store, sender }
    }

    /// Run one dispatch pass over at most `limit` pending entries
    /// (clamped to `[1, 200]`, default 50), oldest first.
    ///
    /// Each entry gets exactly one delivery attempt. Failures (channel
    /// rejection, transport error, non-2xx status) mark the entry
    /// `failed` and the pass continues; only the initial poll aborts the
    /// pass. No retry occurs within a pass.
    pub async fn dispatch_pending(
        &self,
        limit: Option<i64>,
    ) -> Result<DispatchReport, StoreError> {
        let limit = clamp_dispatch_limit(limit);
        let entries = self.store.fetch_pending_notifications(limit).await?;
        let polled = entries.len();

        let mut sent_count = 0usize;
        let mut failed: Vec<FailedDelivery> = Vec::new();

        for entry in entries {
            let attempts = entry.attempts + 1;
            match self.deliver(&entry).await {
                Ok(()) => {
                    match self.store.mark_notification_sent(entry.id, attempts).await {
                        Ok(()) => {
                            tracing::info!(entry_id = entry.id, "Notification delivered");
                            sent_count += 1;
                        }
                        Err(e) => {
                            // Delivered but not recorded: fold into the
                            // failed list so the outcome is never silent.
                            let message = format!("update_sent_failed:{e}");
                            tracing::warn!(entry_id = entry.id, error = %e, "Sent bookkeeping failed");
                            self.record_failure(entry.id, attempts, &message).await;
                            failed.push(FailedDelivery {
                                id: entry.id,
                                error: message,
                            });
                        }
                    }
                }
                Err(message) => {
                    tracing::warn!(entry_id = entry.id, error = %message, "Notification delivery failed");
                    self.record_failure(entry.id, attempts, &message).await;
                    failed.push(FailedDelivery {
                        id: entry.id,
                        error: message,
                    });
                }
            }
        }

        Ok(DispatchReport {
            polled,
            sent_count,
            failed_count: failed.len(),
            failed,
        })
    }

    /// One delivery attempt. Returns the machine-readable error string on
    /// failure.
    async fn deliver(&self, entry: &OutboxEntry) -> Result<(), String> {
        if !entry.channel.eq_ignore_ascii_case(CHANNEL_WEBHOOK) {
            return Err(format!("unsupported_channel:{}", entry.channel));
        }

        let payload = serde_json::json!({
            "subject": entry.subject,
            "body": entry.body,
            "details": entry.payload,
        });

        self.sender
            .post_json(&entry.destination, &payload)
            .await
            .map_err(|e| e.to_string())
    }

    /// Best-effort failure bookkeeping; its own failure is only logged.
    async fn record_failure(&self, id: DbId, attempts: i32, error: &str) {
        if let Err(e) = self
            .store
            .mark_notification_failed(id, attempts, error)
            .await
        {
            tracing::warn!(entry_id = id, error = %e, "Failed bookkeeping failed");
        }
    }
}
