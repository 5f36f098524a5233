/// Chat session client for tutorchat
///
/// The rest of the crate talks to the model only through [`ChatSession`]:
/// send one message, get the complete reply text back. The session keeps
/// whatever conversation history the remote side needs.
///
/// # Usage
///
/// ```rust,no_run
/// use tutorchat::ai::{ChatSession, GeminiSession};
/// use tutorchat::config::Settings;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = GeminiSession::new(Settings::from_env()?)?;
/// let reply = session.send_message("Hello").await?;
/// # Ok(())
/// # }
/// ```
mod gemini;

use async_trait::async_trait;

pub use gemini::{GeminiSession, extract_error_message, extract_reply_text};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("the model returned no text (reason: {reason})")]
    EmptyReply { reason: String },

    #[error("{0}")]
    Message(String),
}

impl ChatError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send `text` as the next user turn and wait for the full reply.
    async fn send_message(&self, text: &str) -> ChatResult<String>;
}
