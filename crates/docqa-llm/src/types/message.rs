use serde::{Deserialize, Serialize};

/// Chat message types (provider-agnostic)
///
/// Serializes to the OpenAI wire shape, e.g. `{"role":"user","content":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt (instructions)
    System { content: String },

    /// User/Human message
    #[serde(rename = "user")]
    Human { content: String },
}

impl Message {
    /// Create system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create human message
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::System { content } | Self::Human { content } => content,
        }
    }
}
