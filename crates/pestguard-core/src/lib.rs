pub mod error;
pub mod constants;
pub mod llm;
pub mod auth;
pub mod assistant;
pub mod advice;
pub mod detection;
pub mod config;

// Re-export key types
pub use error::{ApiError, PestGuardError};
pub use llm::{CompletionReply, CompletionRequest, LlmClient, Message, Role};
pub use auth::{CredentialStore, DefaultAccount};
pub use assistant::{ConversationSession, SessionOptions, TranscriptStore};
pub use advice::{AssistantReply, MitigationAdvice};
pub use detection::{Detection, DetectionCounts, DetectionExport, DetectionReport};
pub use config::Settings;
