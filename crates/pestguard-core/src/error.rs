use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PestGuardError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Storage unreadable: {path}: {message}")]
    StorageUnreadable { path: PathBuf, message: String },

    #[error("Storage write failed: {path}: {message}")]
    StorageWriteFailed { path: PathBuf, message: String },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Detection error: {0}")]
    Detection(String),
}

impl PestGuardError {
    pub fn unreadable(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::StorageUnreadable {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::StorageWriteFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PestGuardError>;

/// Failure of a single chat turn. Returned as a value from
/// [`ConversationSession::chat`](crate::assistant::ConversationSession::chat),
/// the `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Sorry, I ran into an error: {message}")]
    Rejected { status: u16, message: String },

    #[error("Completion call failed: {0}")]
    Transport(String),

    #[error("Completion call failed: no reply within {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

impl From<PestGuardError> for ApiError {
    fn from(err: PestGuardError) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_embeds_provider_message() {
        let err = ApiError::Rejected {
            status: 401,
            message: "Invalid API-key provided.".into(),
        };
        assert_eq!(
            err.to_string(),
            "Sorry, I ran into an error: Invalid API-key provided."
        );
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_from_core_error() {
        let err: ApiError = PestGuardError::Llm("connection reset".into()).into();
        assert!(err.is_transport());
        assert!(err.to_string().contains("connection reset"));
    }
}
