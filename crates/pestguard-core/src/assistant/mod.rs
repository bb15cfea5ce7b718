mod prompt;
mod session;
pub mod transcript;

pub use prompt::{
    apply_detection_context, compose_structured_request, contains_trigger,
    render_detection_context,
};
pub use session::{ConversationSession, SessionOptions};
pub use transcript::{SavedTranscript, TranscriptStore};
