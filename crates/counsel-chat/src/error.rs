//! Error types for the conversational assistant.

use counsel_core::error::CounselError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("conversation log error: {0}")]
    Log(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ChatError {
    /// Whether the error comes from rejecting the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::MessageTooLong(_))
    }
}

/// Failure of a downstream booking or messaging collaborator.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Storage(#[from] CounselError),
}
