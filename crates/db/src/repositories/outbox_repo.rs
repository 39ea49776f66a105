//! Repository for the `admin_notification_outbox` table.
//!
//! Status updates here are plain last-writer-wins UPDATEs: the dispatcher
//! runs sequentially within an invocation and the outbox carries no claim
//! semantics, only durable bookkeeping of delivery outcomes.

use sqlx::PgPool;
use warden_core::outbox::OutboxStatus;
use warden_core::types::DbId;

use crate::models::outbox::{NewOutboxEntry, OutboxEntry};

/// Column list for `admin_notification_outbox` queries.
const COLUMNS: &str = "\
    id, channel, destination, subject, body, payload, \
    status, attempts, last_error, sent_at, created_at";

/// Provides pending polls and outcome updates for queued notifications.
pub struct OutboxRepo;

impl OutboxRepo {
    /// Queue a new pending notification.
    pub async fn enqueue(
        pool: &PgPool,
        input: &NewOutboxEntry<'_>,
    ) -> Result<OutboxEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_notification_outbox \
                 (channel, destination, subject, body, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(input.channel)
            .bind(input.destination)
            .bind(input.subject)
            .bind(input.body)
            .bind(input.payload)
            .fetch_one(pool)
            .await
    }

    /// Fetch up to `limit` pending entries, oldest first.
    ///
    /// FIFO ordering keeps long-queued alerts from being starved by newer
    /// ones. Only `pending` rows are ever selected; `failed` rows require
    /// an external status reset before they become eligible again.
    pub async fn fetch_pending(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<OutboxEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_notification_outbox \
             WHERE status = $1 \
             ORDER BY created_at ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, OutboxEntry>(&query)
            .bind(OutboxStatus::Pending.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark an entry delivered: status `sent`, attempts updated, error
    /// cleared, delivery time stamped.
    pub async fn mark_sent(
        pool: &PgPool,
        id: DbId,
        attempts: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE admin_notification_outbox \
             SET status = $2, attempts = $3, last_error = NULL, sent_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(OutboxStatus::Sent.as_str())
        .bind(attempts)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark an entry failed: status `failed`, attempts updated, error
    /// recorded.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        attempts: i32,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE admin_notification_outbox \
             SET status = $2, attempts = $3, last_error = $4 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(OutboxStatus::Failed.as_str())
        .bind(attempts)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Reset a failed entry to `pending` (operator recovery path).
    pub async fn reset_to_pending(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE admin_notification_outbox \
             SET status = $2, last_error = NULL \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(OutboxStatus::Pending.as_str())
        .bind(OutboxStatus::Failed.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
