//! Hosted model providers
//!
//! `ChatProvider` is the seam between the HTTP handler and the upstream
//! model API. The handler only ever talks to a `ChatSession`, which seeds
//! the provider with prior turns and sends the newest message.

pub mod gemini;

pub use gemini::GeminiProvider;

use crate::history::{Role, Turn};
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("Provider returned no text (finish reason: {0})")]
    EmptyResponse(String),
}

/// A hosted conversational-completion service
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send `message` as the newest user turn after `history` and return the reply text
    async fn send_message(&self, history: &[Turn], message: &str) -> Result<String, ProviderError>;

    /// Model identifier, for logs and the health endpoint
    fn model(&self) -> &str;
}

/// A conversation seeded with prior turns
///
/// Lives for a single request; nothing is persisted between requests.
pub struct ChatSession<'a> {
    provider: &'a dyn ChatProvider,
    history: Vec<Turn>,
}

impl<'a> ChatSession<'a> {
    /// Start a session on top of already-translated history
    pub fn start(provider: &'a dyn ChatProvider, history: Vec<Turn>) -> Self {
        Self { provider, history }
    }

    /// Turns sent so far, including replies received in this session
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Send a message; on success both the message and the reply join the history
    pub async fn send_message(&mut self, message: &str) -> Result<String, ProviderError> {
        let reply = self.provider.send_message(&self.history, message).await?;

        self.history.push(Turn::new(Role::User, message));
        self.history.push(Turn::new(Role::Model, reply.as_str()));

        Ok(reply)
    }
}
