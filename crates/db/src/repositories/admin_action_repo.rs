//! Store-side admin action procedures.
//!
//! Each destructive action is a SQL function owned by the store: it
//! applies the account-state change, appends an audit row, and returns a
//! JSON receipt. The worker core only forwards target/actor identifiers;
//! all locking and idempotency live inside the function.

use sqlx::PgPool;

/// Invokes the per-target admin action functions.
pub struct AdminActionRepo;

impl AdminActionRepo {
    /// Force sign-out of all sessions for `target_user_id`.
    pub async fn signout_user(
        pool: &PgPool,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_signout_user($1, $2)")
            .bind(target_user_id)
            .bind(actor_user_id)
            .fetch_one(pool)
            .await
    }

    /// Require multi-factor authentication for `target_user_id`.
    pub async fn enforce_mfa(
        pool: &PgPool,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_enforce_mfa($1, $2)")
            .bind(target_user_id)
            .bind(actor_user_id)
            .fetch_one(pool)
            .await
    }

    /// Delete the account `target_user_id`.
    pub async fn delete_account(
        pool: &PgPool,
        target_user_id: &str,
        actor_user_id: &str,
    ) -> Result<serde_json::Value, sqlx::Error> {
        sqlx::query_scalar("SELECT admin_delete_account($1, $2)")
            .bind(target_user_id)
            .bind(actor_user_id)
            .fetch_one(pool)
            .await
    }
}
