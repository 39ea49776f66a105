//! Bearer-token authentication extractor for the worker and governance
//! endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warden_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the caller presented the configured worker token.
///
/// Use this as an extractor parameter in any handler reserved for the
/// scheduler:
///
/// ```ignore
/// async fn my_handler(_auth: WorkerAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WorkerAuth;

impl FromRequestParts<AppState> for WorkerAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if token != state.config.worker_token {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid worker token".into(),
            )));
        }

        Ok(WorkerAuth)
    }
}
