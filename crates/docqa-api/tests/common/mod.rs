#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use docqa_api::{build_router, config::Config, state::AppState};
use docqa_core::{DocumentAssistant, DocumentExtractor, InferenceSettings, TextExtractor};
use docqa_llm::{ChatClient, ChatRequest, ChatResponse};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

pub const BOUNDARY: &str = "docqa-test-boundary";

/// Treats file bytes as UTF-8; bodies containing `%corrupt` fail to parse
pub struct FakePdfExtractor;

impl TextExtractor for FakePdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> anyhow::Result<String> {
        let text = std::str::from_utf8(bytes)?;
        if text.contains("%corrupt") {
            anyhow::bail!("invalid cross-reference table");
        }
        Ok(text.to_string())
    }
}

/// Chat model stand-in: fixed reply, counts calls, keeps the last request
#[derive(Default)]
pub struct MockChat {
    pub reply: String,
    pub delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChat {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            ..Default::default()
        })
    }

    /// Answers only after `delay`
    pub fn slow(reply: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            delay: Some(delay),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Text of the last user prompt sent to the model
    pub fn last_prompt(&self) -> String {
        self.last_request()
            .and_then(|r| r.messages.last().map(|m| m.text().to_string()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatClient for MockChat {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ChatResponse::text(self.reply.clone()))
    }
}

pub fn test_state(chat: Arc<MockChat>, credential_configured: bool) -> Arc<AppState> {
    let settings = InferenceSettings::new("test-model", credential_configured);
    state_with(chat, settings, Config::default())
}

pub fn state_with(chat: Arc<MockChat>, settings: InferenceSettings, config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(
        config,
        DocumentExtractor::new(Arc::new(FakePdfExtractor)),
        DocumentAssistant::new(chat, settings),
    ))
}

pub fn test_app(chat: Arc<MockChat>) -> Router {
    build_router(test_state(chat, true))
}

/// Multipart body with one `files` part per entry, in order
pub fn multipart_body(files: &[(&str, &str)]) -> String {
    let mut body = String::new();
    if files.is_empty() {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nnothing attached\r\n"
        ));
    }
    for (name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/pdf\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn extract_request(path: &str, files: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

pub fn json_request(path: &str, body: Value) -> Request<Body> {
    raw_json_request(path, body.to_string())
}

pub fn raw_json_request(path: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
