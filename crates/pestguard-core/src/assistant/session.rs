use super::prompt::{apply_detection_context, contains_trigger, render_detection_context};
use crate::constants::{assistant, models};
use crate::detection::{DetectionCounts, DetectionReport};
use crate::error::ApiError;
use crate::llm::{CompletionReply, CompletionRequest, LlmClient, Message, Role};
use std::sync::Arc;
use std::time::Duration;

/// Model parameters and persona configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_history: usize,
    pub system_prompt: String,
    pub advisor_prompt: String,
    pub trigger_terms: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_DASHSCOPE_MODEL.to_string(),
            temperature: models::DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(assistant::DEFAULT_TIMEOUT_SECS),
            max_history: assistant::MAX_HISTORY,
            system_prompt: assistant::SYSTEM_PROMPT.to_string(),
            advisor_prompt: assistant::ADVISOR_PROMPT.to_string(),
            trigger_terms: assistant::TRIGGER_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// A bounded multi-turn conversation with the pest advisor.
///
/// `history[0]` is always the system prompt. After every turn the history
/// holds at most `max_history` messages.
pub struct ConversationSession {
    client: Arc<dyn LlmClient>,
    options: SessionOptions,
    history: Vec<Message>,
    detection_results: DetectionCounts,
}

impl ConversationSession {
    pub fn new(client: Arc<dyn LlmClient>, options: SessionOptions) -> Self {
        let history = vec![Message::system(&options.system_prompt)];
        Self {
            client,
            options,
            history,
            detection_results: DetectionCounts::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn detection_results(&self) -> &DetectionCounts {
        &self.detection_results
    }

    /// Replace the detection results wholesale.
    pub fn set_detection_results(&mut self, results: DetectionCounts) {
        self.detection_results = results;
    }

    /// Summary of the current detection results, or a notice that none exist.
    pub fn detection_context(&self) -> String {
        render_detection_context(&self.detection_results)
    }

    /// Start over with the original persona. Detection results are kept.
    pub fn reset(&mut self) {
        self.history = vec![Message::system(&self.options.system_prompt)];
    }

    /// Run one turn.
    ///
    /// Failures come back as `Err(ApiError)` values whose text is meant for the
    /// user. On failure the user turn stays in the history without a reply.
    /// The history is trimmed either way.
    pub async fn chat(
        &mut self,
        user_input: &str,
        include_detection: bool,
    ) -> Result<String, ApiError> {
        self.history.push(Message::user(user_input));

        if include_detection
            && !self.detection_results.is_empty()
            && contains_trigger(user_input, &self.options.trigger_terms)
        {
            tracing::debug!(
                categories = self.detection_results.len(),
                "injecting detection context"
            );
            self.history = apply_detection_context(
                &self.history,
                &self.detection_results,
                user_input,
                &self.options.advisor_prompt,
            );
        }

        let outcome = self
            .complete(&self.history, self.options.temperature)
            .await;

        if let Ok(reply) = &outcome {
            self.history.push(Message::assistant(reply));
        }
        self.trim_history();
        outcome
    }

    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, ApiError> {
        let request = CompletionRequest {
            model: &self.options.model,
            messages,
            temperature,
        };

        let outcome = tokio::time::timeout(self.options.timeout, self.client.complete(&request))
            .await
            .map_err(|_| {
                tracing::warn!(timeout = ?self.options.timeout, "completion call timed out");
                ApiError::Timeout(self.options.timeout)
            })?;

        match outcome {
            Ok(CompletionReply::Ok(reply)) => Ok(reply),
            Ok(CompletionReply::Rejected { status, message }) => {
                tracing::warn!(status, "completion rejected: {message}");
                Err(ApiError::Rejected { status, message })
            }
            Err(e) => {
                tracing::warn!("completion call failed: {e}");
                Err(ApiError::from(e))
            }
        }
    }

    /// Keep the system prompt plus the most recent `max_history - 1` messages.
    fn trim_history(&mut self) {
        let max = self.options.max_history.max(1);
        if self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.drain(1..1 + excess);
        }
    }

    /// One-shot review of a detection report by an image-analysis persona.
    /// Does not touch the conversation history.
    pub async fn analyze_report(&self, report: &DetectionReport) -> Result<String, ApiError> {
        let messages = [
            Message::system(assistant::ANALYST_PROMPT),
            Message::user(report.analysis_prompt()),
        ];
        self.complete(&messages, assistant::ANALYSIS_TEMPERATURE).await
    }

    /// User and assistant turns as `You: ...` / `AI: ...` lines.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let speaker = if m.role == Role::User { "You" } else { "AI" };
                format!("{speaker}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
