use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub inference_configured: bool,
    pub model: String,
}

/// Health check endpoint
///
/// Reports whether inference can run without calling the provider.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let settings = state.assistant.settings();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        inference_configured: settings.credential_configured,
        model: settings.model.clone(),
    })
}
