//! Governance maintenance procedures.
//!
//! What counts as "stale", "overdue", or "past SLA" is store-side policy:
//! these SQL functions own the window arithmetic and return the number of
//! rows they touched. The governance pass calls them in a fixed order
//! before dispatching the outbox.

use sqlx::PgPool;

/// Invokes the governance maintenance functions.
pub struct GovernanceRepo;

impl GovernanceRepo {
    /// Assign an owner and SLA deadline to unowned pending approvals.
    pub async fn assign_approval_owners(
        pool: &PgPool,
        sla_hours: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_assign_approval_owners($1)")
            .bind(sla_hours)
            .fetch_one(pool)
            .await
    }

    /// Expire pending approvals older than `max_age_hours`.
    pub async fn expire_stale_approvals(
        pool: &PgPool,
        max_age_hours: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_expire_stale_approvals($1)")
            .bind(max_age_hours)
            .fetch_one(pool)
            .await
    }

    /// End impersonation sessions past their expiry.
    pub async fn expire_impersonation_sessions(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_expire_impersonation_sessions()")
            .fetch_one(pool)
            .await
    }

    /// Flag pending approvals older than `overdue_hours` as overdue.
    pub async fn raise_overdue_alerts(
        pool: &PgPool,
        overdue_hours: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_raise_overdue_alerts($1)")
            .bind(overdue_hours)
            .fetch_one(pool)
            .await
    }

    /// Queue SLA escalation notifications for overdue approvals that have
    /// not yet been escalated. Returns the number of outbox rows written.
    pub async fn enqueue_sla_escalations(
        pool: &PgPool,
        overdue_hours: i64,
        channel: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_enqueue_sla_escalations($1, $2)")
            .bind(overdue_hours)
            .bind(channel)
            .fetch_one(pool)
            .await
    }
}
