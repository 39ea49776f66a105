use std::sync::Arc;

use warden_worker::{AdminStore, WebhookSender};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
///
/// The store and webhook sender are held as trait objects so integration
/// tests can swap in in-memory doubles without touching the router.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: warden_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Store boundary used by the batch runner and outbox dispatcher.
    pub store: Arc<dyn AdminStore>,
    /// Webhook delivery used by the outbox dispatcher.
    pub webhook: Arc<dyn WebhookSender>,
}
