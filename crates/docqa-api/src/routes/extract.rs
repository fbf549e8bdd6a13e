use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use docqa_core::{ExtractResponse, UploadedFile};
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

/// Multipart field carrying the uploaded documents
pub const FILES_FIELD: &str = "files";

/// Extract text from up to three uploaded PDFs
///
/// Files are read from the repeated `files` field; other fields are ignored.
/// The joined text keeps upload order.
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ExtractResponse>> {
    let mut multipart = multipart?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        let mut file = UploadedFile::new(filename, bytes.to_vec());
        if let Some(content_type) = content_type {
            file = file.with_content_type(content_type);
        }
        files.push(file);
    }

    tracing::debug!(count = files.len(), "Received upload");

    let response = state.extractor.extract(files).await?;
    Ok(Json(response))
}
