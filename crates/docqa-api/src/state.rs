use docqa_core::{DocumentAssistant, DocumentExtractor, InferenceSettings};
use docqa_llm::{ClientFactory, ProviderConfig};
use std::{sync::Arc, time::Duration};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Handlers are stateless; this only carries configuration and the two
/// collaborators (PDF parsing, chat model) they call into.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: DocumentExtractor,
    pub assistant: DocumentAssistant,
}

impl AppState {
    pub fn new(config: Config, extractor: DocumentExtractor, assistant: DocumentAssistant) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
            assistant,
        }
    }

    /// Wire the production collaborators: pdf-extract and the Groq client.
    ///
    /// A missing credential is not fatal here; each inference request
    /// reports it instead.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let mut provider = ProviderConfig::new(config.groq_api_key.clone().unwrap_or_default());
        if let Some(base_url) = &config.base_url {
            provider = provider.with_base_url(base_url.clone());
        }

        let client = ClientFactory::create_chat_client(provider)?;
        let settings = InferenceSettings::new(config.model.clone(), config.credential_configured())
            .with_timeout(Duration::from_secs(config.server.inference_timeout_secs));

        Ok(Self::new(
            config,
            DocumentExtractor::default(),
            DocumentAssistant::new(client, settings),
        ))
    }
}
