use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tokio::fs;
use tracing::{error, info};

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    content: String,
}

/// Liveness plus a check that the content directory is still readable.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let content_dir = state.config.content_dir();
    match fs::metadata(content_dir).await {
        Ok(meta) if meta.is_dir() => {
            info!("Health check passed");
            Ok(Json(HealthResponse {
                status: "OK".to_string(),
                content: "readable".to_string(),
            }))
        }
        _ => {
            error!(dir = %content_dir.display(), "content directory unavailable");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
