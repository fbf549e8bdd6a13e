use serde_json::Value;
use thiserror::Error;

pub use reqwest::StatusCode;

/// Non-success reply from the inference provider.
///
/// Travels inside `anyhow::Error`; callers that want the structured body
/// use `downcast_ref::<ProviderError>()`.
#[derive(Debug, Error)]
#[error("Provider API error ({status}): {message}")]
pub struct ProviderError {
    pub status: u16,
    pub status_text: Option<String>,
    pub message: String,
    /// Parsed JSON error body, when the provider sent one
    pub body: Option<Value>,
}

impl ProviderError {
    /// Build from a status code and the raw response text.
    ///
    /// OpenAI-compatible providers answer `{"error": {"message": ...}}`; the
    /// inner message is lifted out when present.
    pub fn from_response(status: StatusCode, text: &str) -> Self {
        let body: Option<Value> = serde_json::from_str(text).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.pointer("/error/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text.to_string()
                }
            });

        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            message,
            body,
        }
    }

    /// Structured detail for callers: the JSON body, else the status text
    pub fn details(&self) -> Option<Value> {
        self.body
            .clone()
            .or_else(|| self.status_text.clone().map(Value::String))
    }
}
