mod client;

pub use client::{OpenAIClient, OpenAIClientBuilder, DEFAULT_BASE_URL};
