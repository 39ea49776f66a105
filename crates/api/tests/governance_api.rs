//! Integration tests for the governance maintenance endpoint, backed by
//! Postgres with a recorded webhook edge.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, TEST_TOKEN};
use serde_json::json;
use sqlx::PgPool;

const HOOK_URL: &str = "https://hooks.test/escalations";

async fn set_escalation_endpoint(pool: &PgPool) {
    sqlx::query("INSERT INTO admin_settings (key, value) VALUES ('escalation_webhook_url', $1)")
        .bind(HOOK_URL)
        .execute(pool)
        .await
        .unwrap();
}

/// Insert a pending approval request `age_hours` old.
async fn insert_approval(pool: &PgPool, age_hours: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO admin_approval_requests (requested_by, action_type, created_at) \
         VALUES ('admin-1', 'delete_account', NOW() - make_interval(hours => $1::int)) \
         RETURNING id",
    )
    .bind(age_hours)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_returns_401(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/governance/run", None, json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_on_run_returns_405(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/governance/run").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ---------------------------------------------------------------------------
// Maintenance pass
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_pass_returns_200_with_effective_defaults(pool: PgPool) {
    let (app, webhook) = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/governance/run", Some(TEST_TOKEN), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["staleApprovalHours"], 72);
    assert_eq!(body["overdueApprovalHours"], 24);
    assert_eq!(body["slaHours"], 24);
    assert_eq!(body["escalationChannel"], "webhook");
    assert_eq!(body["assignedApprovalOwners"], 0);
    assert_eq!(body["expiredApprovals"], 0);
    assert_eq!(body["expiredImpersonationSessions"], 0);
    assert_eq!(body["createdOverdueAlerts"], 0);
    assert_eq!(body["queuedEscalations"], 0);
    assert_eq!(body["dispatch"]["polled"], 0);
    assert!(body["runAt"].is_string());
    assert!(webhook.requests().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overdue_approval_is_escalated_and_delivered(pool: PgPool) {
    set_escalation_endpoint(&pool).await;
    let approval_id = insert_approval(&pool, 48).await;

    let (app, webhook) = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/governance/run", Some(TEST_TOKEN), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["assignedApprovalOwners"], 1);
    assert_eq!(body["createdOverdueAlerts"], 1);
    assert_eq!(body["queuedEscalations"], 1);
    assert_eq!(body["dispatch"]["polled"], 1);
    assert_eq!(body["dispatch"]["sentCount"], 1);
    assert_eq!(body["dispatch"]["failedCount"], 0);

    // The queued alert was delivered to the configured endpoint and
    // carries the approval reference.
    let requests = webhook.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, HOOK_URL);
    assert_eq!(requests[0].1["subject"], "Approval SLA breached");
    assert_eq!(requests[0].1["details"]["approval_request_id"], approval_id);

    // The outbox row is terminal; a second pass finds nothing.
    let status: String =
        sqlx::query_scalar("SELECT status FROM admin_notification_outbox")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "sent");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn escalation_is_queued_only_once(pool: PgPool) {
    set_escalation_endpoint(&pool).await;
    insert_approval(&pool, 48).await;

    let (app, _) = common::build_test_app(pool.clone());
    let first = post_json(
        app.clone(),
        "/api/v1/governance/run",
        Some(TEST_TOKEN),
        json!({}),
    )
    .await;
    assert_eq!(body_json(first).await["queuedEscalations"], 1);

    // The approval is already escalated; nothing new is queued.
    let second = post_json(app, "/api/v1/governance/run", Some(TEST_TOKEN), json!({})).await;
    let body = body_json(second).await;
    assert_eq!(body["queuedEscalations"], 0);
    assert_eq!(body["dispatch"]["polled"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_approval_expires_instead_of_escalating(pool: PgPool) {
    set_escalation_endpoint(&pool).await;
    insert_approval(&pool, 100).await;

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/governance/run", Some(TEST_TOKEN), json!({})).await;

    let body = body_json(response).await;
    // Expiry runs before the overdue/escalation steps, so a stale
    // approval leaves the pending set first.
    assert_eq!(body["expiredApprovals"], 1);
    assert_eq!(body["createdOverdueAlerts"], 0);
    assert_eq!(body["queuedEscalations"], 0);

    let status: String = sqlx::query_scalar("SELECT status FROM admin_approval_requests")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "expired");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_impersonation_sessions_are_ended(pool: PgPool) {
    sqlx::query(
        "INSERT INTO admin_impersonation_sessions (actor_user_id, target_user_id, expires_at) \
         VALUES ('admin-1', 'u1', NOW() - INTERVAL '1 hour')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/governance/run", Some(TEST_TOKEN), json!({})).await;

    let body = body_json(response).await;
    assert_eq!(body["expiredImpersonationSessions"], 1);

    let status: String = sqlx::query_scalar("SELECT status FROM admin_impersonation_sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "expired");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_delivery_yields_207(pool: PgPool) {
    set_escalation_endpoint(&pool).await;
    insert_approval(&pool, 48).await;

    let (app, webhook) = common::build_test_app(pool.clone());
    webhook.respond_with(HOOK_URL, 500);

    let response = post_json(app, "/api/v1/governance/run", Some(TEST_TOKEN), json!({})).await;

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["dispatch"]["failedCount"], 1);
    assert_eq!(body["dispatch"]["failed"][0]["error"], "webhook_status_500");

    let entry: (String, Option<String>) = sqlx::query_as(
        "SELECT status, last_error FROM admin_notification_outbox",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(entry.0, "failed");
    assert_eq!(entry.1.as_deref(), Some("webhook_status_500"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn request_options_are_clamped_and_echoed(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/governance/run",
        Some(TEST_TOKEN),
        json!({
            "staleApprovalHours": 9999,
            "overdueApprovalHours": 0,
            "slaHours": 10000,
            "dispatchLimit": 500,
            "escalationChannel": "webhook"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["staleApprovalHours"], 2160);
    assert_eq!(body["overdueApprovalHours"], 1);
    assert_eq!(body["slaHours"], 720);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn escalation_channel_is_normalized_to_lowercase(pool: PgPool) {
    set_escalation_endpoint(&pool).await;
    insert_approval(&pool, 48).await;

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/governance/run",
        Some(TEST_TOKEN),
        json!({ "escalationChannel": "WebHook" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["escalationChannel"], "webhook");
    assert_eq!(body["dispatch"]["sentCount"], 1);

    // The persisted outbox row carries the canonical channel, not the
    // caller's casing.
    let channel: String = sqlx::query_scalar("SELECT channel FROM admin_notification_outbox")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(channel, "webhook");
}
