use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use docqa_core::{SummarizeRequest, SummarizeResponse};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Summarize extracted text at the requested length level, echoing `color`
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> ApiResult<Json<SummarizeResponse>> {
    let Json(request) = payload.map_err(ApiError::from)?;

    let response = state.assistant.summarize(request).await?;
    Ok(Json(response))
}
