//! Query and summarize handlers

use docqa_llm::{ChatClient, ChatOptions, ChatRequest, Message, ProviderError};
use std::sync::Arc;
use std::time::Duration;

use crate::error::InferenceError;
use crate::templates::{self, LengthLevel};
use crate::wire::{QueryRequest, QueryResponse, SummarizeRequest, SummarizeResponse};

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const CREDENTIAL_ENV: &str = "GROQ_API_KEY";
pub const MODEL_ENV: &str = "GROQ_MODEL";

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 2048;

pub const NO_ANSWER: &str = "No answer generated.";
pub const NO_SUMMARY: &str = "No summary generated.";

#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub model: String,
    /// Whether a provider credential was found at startup. Without one,
    /// every request fails before any network call.
    pub credential_configured: bool,
    /// Deadline for a single model call
    pub timeout: Option<Duration>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            credential_configured: false,
            timeout: None,
        }
    }
}

impl InferenceSettings {
    pub fn new(model: impl Into<String>, credential_configured: bool) -> Self {
        Self {
            model: model.into(),
            credential_configured,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Builds prompts from caller-supplied text and forwards them to the model.
/// Holds no per-request state.
#[derive(Clone)]
pub struct DocumentAssistant {
    client: Arc<dyn ChatClient>,
    settings: InferenceSettings,
}

impl DocumentAssistant {
    pub fn new(client: Arc<dyn ChatClient>, settings: InferenceSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    pub async fn query(&self, request: QueryRequest) -> Result<QueryResponse, InferenceError> {
        if request.text.trim().is_empty() || request.question.trim().is_empty() {
            return Err(InferenceError::MissingInput("Text and question are required"));
        }
        self.ensure_credential()?;

        let messages = templates::query_messages(&request.question, &request.text);
        let answer = self.complete(messages).await?;

        Ok(QueryResponse {
            answer: answer.unwrap_or_else(|| NO_ANSWER.to_string()),
        })
    }

    pub async fn summarize(
        &self,
        request: SummarizeRequest,
    ) -> Result<SummarizeResponse, InferenceError> {
        if request.text.trim().is_empty() {
            return Err(InferenceError::MissingInput("Text is required"));
        }
        self.ensure_credential()?;

        let level = LengthLevel::from_json(request.length.as_ref());
        let messages = templates::summary_messages(level, &request.text);
        let summary = self.complete(messages).await?;

        Ok(SummarizeResponse {
            summary: summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
            color: request.color,
        })
    }

    fn ensure_credential(&self) -> Result<(), InferenceError> {
        if self.settings.credential_configured {
            Ok(())
        } else {
            Err(InferenceError::ServiceUnavailable(CREDENTIAL_ENV))
        }
    }

    /// One call, no retries. `None` when the model returned no usable text.
    async fn complete(&self, messages: Vec<Message>) -> Result<Option<String>, InferenceError> {
        let options = ChatOptions::new().temperature(TEMPERATURE).max_tokens(MAX_TOKENS);
        let request = ChatRequest::new(self.settings.model.clone(), messages).with_options(options);

        let call = self.client.chat(request);
        let outcome = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                tracing::error!(timeout = ?limit, model = %self.settings.model, "Inference call timed out");
                InferenceError::InferenceFailed {
                    message: format!("Inference request timed out after {:?}", limit),
                    details: None,
                }
            })?,
            None => call.await,
        };

        let response = outcome.map_err(|e| {
            tracing::error!(error = %format!("{:#}", e), model = %self.settings.model, "Inference call failed");
            match e.downcast_ref::<ProviderError>() {
                Some(provider) => InferenceError::InferenceFailed {
                    message: provider.message.clone(),
                    details: provider.details(),
                },
                None => InferenceError::InferenceFailed {
                    message: format!("{:#}", e),
                    details: None,
                },
            }
        })?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Inference call completed"
            );
        }

        Ok(response.content.filter(|c| !c.is_empty()))
    }
}
