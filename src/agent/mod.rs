use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;
pub mod registry;

/// Text shown in place of a reply whenever the provider call fails.
pub const AGENT_UNAVAILABLE: &str = "Error: Could not connect to the agent.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One exchanged message inside a chat session's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("reply contained no text")]
    EmptyReply,
}

/// Hosted chat backend. `history` holds every prior turn of the session
/// followed by the new user turn, oldest first.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn generate(&self, history: &[Turn]) -> Result<String, ProviderError>;
}
