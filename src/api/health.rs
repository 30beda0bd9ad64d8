//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Storage backend, reported by the readiness check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl HealthResponse {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage: None,
        }
    }

    fn with_storage(mut self, state: &AppState) -> Self {
        self.storage = Some(state.config.database.backend.as_str().to_string());
        self
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy"))
}

/// Readiness check endpoint (checks storage connectivity)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Storage unreachable", body = HealthResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    match state.services.books.ping().await {
        Ok(()) => Ok(Json(HealthResponse::new("ready").with_storage(&state))),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new("unavailable").with_storage(&state)),
            ))
        }
    }
}
