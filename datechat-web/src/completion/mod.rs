//! Chat-completion backends.
//!
//! The flow controller only needs one call: given the instruction, the
//! conversation so far and the user's credential, produce the next reply.

mod openai;

pub use openai::OpenAICompletion;

use async_trait::async_trait;

/// Error from a completion backend.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{provider}:{model}] {message}")]
pub struct CompletionError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

/// Produces the assistant's next turn.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// `history` alternates turns and ends with the partner's newest message.
    async fn request_reply(
        &self,
        instruction: &str,
        history: &[String],
        api_key: &str,
    ) -> Result<String, CompletionError>;
}

/// Chat role of entry `index` in a history of `len` entries.
///
/// Turns alternate backwards from the newest entry, which is always the
/// partner's message (`user`); the persona's turns are `assistant`.
pub fn role_for_position(index: usize, len: usize) -> &'static str {
    if (len - 1 - index) % 2 == 0 {
        "user"
    } else {
        "assistant"
    }
}
