//! Integration tests for the batch worker endpoint, backed by Postgres.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, TEST_TOKEN};
use serde_json::json;
use sqlx::PgPool;
use warden_db::models::job::NewJob;
use warden_db::repositories::JobRepo;

async fn enqueue(pool: &PgPool, job_type: &str, payload: serde_json::Value) -> i64 {
    let job = JobRepo::enqueue(
        pool,
        &NewJob {
            actor_user_id: "admin-1",
            job_type,
            payload: &payload,
            summary: "",
        },
    )
    .await
    .unwrap();
    job.id
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_returns_401(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/worker/run", None, json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_token_returns_401_without_claiming(pool: PgPool) {
    enqueue(&pool, "signout_user", json!({ "target_user_id": "u1" })).await;

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/worker/run", Some("not-the-token"), json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The rejected request never touched the queue.
    let status: String = sqlx::query_scalar("SELECT status FROM admin_jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_on_run_returns_405(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/worker/run").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ---------------------------------------------------------------------------
// Batch runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_queue_returns_200_with_defaults(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/worker/run", Some(TEST_TOKEN), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["maxJobs"], 20);
    assert_eq!(body["workerId"], "test-worker");
    assert_eq!(body["executedCount"], 0);
    assert_eq!(body["failedCount"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn successful_run_executes_the_job_and_records_state(pool: PgPool) {
    let job_id = enqueue(&pool, "signout_user", json!({ "target_user_id": "u1" })).await;

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/worker/run",
        Some(TEST_TOKEN),
        json!({ "workerId": "w-test", "maxJobs": 5 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["workerId"], "w-test");
    assert_eq!(body["maxJobs"], 5);
    assert_eq!(body["executedCount"], 1);
    assert_eq!(body["executed"][0]["jobId"], job_id);
    assert_eq!(body["executed"][0]["status"], "done");
    assert_eq!(body["executed"][0]["result"]["targetCount"], 1);
    assert_eq!(
        body["executed"][0]["result"]["results"][0]["targetUserId"],
        "u1"
    );

    // Job row reached its terminal state with worker attribution.
    let job = JobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, "done");
    assert_eq!(job.worker_id.as_deref(), Some("w-test"));
    assert_eq!(job.attempt_count, 1);

    // The store-side action left its account-state and audit marks.
    let revoked: bool = sqlx::query_scalar(
        "SELECT sessions_revoked_at IS NOT NULL FROM admin_account_state WHERE user_id = 'u1'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(revoked);

    let audit_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM admin_audit_log \
         WHERE actor_user_id = 'admin-1' AND target_user_id = 'u1' AND action = 'signout_user'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(audit_count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_failure_returns_207(pool: PgPool) {
    enqueue(&pool, "enforce_mfa", json!({ "target_user_id": "u1" })).await;
    let bad_id = enqueue(&pool, "bulk_rename", json!({ "target_user_id": "u2" })).await;

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/worker/run", Some(TEST_TOKEN), json!({})).await;

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["executedCount"], 1);
    assert_eq!(body["failedCount"], 1);
    assert_eq!(body["failed"][0]["jobId"], bad_id);
    assert_eq!(body["failed"][0]["error"], "unsupported_job_type:bulk_rename");

    let job = JobRepo::find_by_id(&pool, bad_id).await.unwrap().unwrap();
    assert_eq!(job.status, "failed");
    assert_eq!(
        job.last_error.as_deref(),
        Some("unsupported_job_type:bulk_rename")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_targets_fail_the_job(pool: PgPool) {
    let job_id = enqueue(&pool, "signout_user", json!({})).await;

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/worker/run", Some(TEST_TOKEN), json!({})).await;

    assert_eq!(response.status(), StatusCode::MULTI_STATUS);
    let body = body_json(response).await;
    assert_eq!(body["failed"][0]["jobId"], job_id);
    assert_eq!(body["failed"][0]["error"], "missing_target_user_ids");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn max_jobs_bounds_the_run(pool: PgPool) {
    for i in 0..3 {
        enqueue(
            &pool,
            "signout_user",
            json!({ "target_user_id": format!("u{i}") }),
        )
        .await;
    }

    let (app, _) = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/worker/run",
        Some(TEST_TOKEN),
        json!({ "maxJobs": 2 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["executedCount"], 2);

    let pending: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM admin_jobs WHERE status = 'pending'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(pending, 1);
}
