use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use docqa_core::{QueryRequest, QueryResponse};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Answer a question about previously extracted text
pub async fn query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<QueryResponse>> {
    let Json(request) = payload.map_err(ApiError::from)?;

    let response = state.assistant.query(request).await?;
    Ok(Json(response))
}
