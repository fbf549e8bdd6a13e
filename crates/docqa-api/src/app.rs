use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    BoxError, Router,
};
use std::{sync::Arc, time::Duration};
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::ApiError,
    middleware::logging,
    routes::{extract, health, query, summarize},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let request_timeout = Duration::from_secs(server.request_timeout_secs);

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Document operations
        .route("/extract", post(extract::extract_text))
        .route("/query", post(query::query))
        .route("/summarize", post(summarize::summarize))
        // Legacy paths
        .route("/api/parse-pdf", post(extract::extract_text))
        .route("/api/query", post(query::query))
        .route("/api/summarize", post(summarize::summarize))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(middleware::from_fn(logging::log_request))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    handle_layer_error(err, request_timeout)
                }))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Errors raised by tower layers still go out as `{error}` JSON
fn handle_layer_error(err: BoxError, timeout: Duration) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::Internal(err.to_string())
    }
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}
