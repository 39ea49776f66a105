//! One-shot batch worker: drain a bounded batch of admin jobs and exit.
//!
//! Intended for cron/scheduler use alongside the HTTP invocation surface
//! in `warden-api`. Configuration comes from the environment:
//! `DATABASE_URL` (required), `WORKER_ID` (default `worker-<uuid>`),
//! `BATCH_MAX_JOBS` (default 20, clamped to 1..=100).

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_worker::{BatchRunner, PgAdminStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = warden_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    let worker_id = std::env::var("WORKER_ID")
        .unwrap_or_else(|_| format!("worker-{}", uuid::Uuid::new_v4()));
    let max_jobs = std::env::var("BATCH_MAX_JOBS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok());

    let runner = BatchRunner::new(Arc::new(PgAdminStore::new(pool)));
    match runner.run(max_jobs, &worker_id).await {
        Ok(report) => {
            tracing::info!(
                worker_id = %report.worker_id,
                executed = report.executed_count,
                failed = report.failed_count,
                ok = report.ok,
                "Batch finished",
            );
            if !report.ok {
                std::process::exit(1);
            }
        }
        Err(aborted) => {
            tracing::error!(
                worker_id = %aborted.worker_id,
                error = %aborted.error,
                executed = aborted.executed.len(),
                failed = aborted.failed.len(),
                "Batch aborted on claim failure",
            );
            std::process::exit(1);
        }
    }
}
