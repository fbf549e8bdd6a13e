pub mod types;
pub mod traits;
pub mod openai;
pub mod config;
pub mod error;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};

pub use openai::{OpenAIClient, OpenAIClientBuilder, DEFAULT_BASE_URL};
pub use config::{ClientFactory, ProviderConfig};
pub use error::ProviderError;
pub use types::Message;
