use pestguard_core::DetectionCounts;
use std::path::PathBuf;

/// Result of processing a slash command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Reset the conversation, keeping detection results.
    Clear,
    /// Quit the application.
    Quit,
    /// Replace the session's detection results.
    SetDetections(DetectionCounts),
    /// Load a detection export file and use its counts.
    LoadDetections(PathBuf),
    /// Show the current detection results.
    ShowResults,
    /// Ask the model to review the last loaded detection export.
    Analyze,
    /// Print the conversation so far.
    ShowHistory,
    /// Save current conversation.
    SaveConversation,
    /// List saved conversations.
    ListConversations,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/clear" | "/new" => CommandResult::Clear,

        // Detection commands
        "/detect" => {
            if arg.is_empty() {
                return CommandResult::Message(
                    "Usage: /detect <name=count,...>\nExample: /detect aphid=3, mite=1".into(),
                );
            }
            match DetectionCounts::parse(arg) {
                Ok(counts) => CommandResult::SetDetections(counts),
                Err(e) => CommandResult::Message(format!("Could not parse detections: {e}")),
            }
        }
        "/load" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /load <detections.json>".into())
            } else {
                CommandResult::LoadDetections(PathBuf::from(arg))
            }
        }
        "/results" => CommandResult::ShowResults,
        "/analyze" => CommandResult::Analyze,

        // Conversation commands
        "/history" => CommandResult::ShowHistory,
        "/save" => CommandResult::SaveConversation,
        "/records" => CommandResult::ListConversations,

        "/version" => {
            CommandResult::Message(format!("PestGuard CLI v{}", env!("CARGO_PKG_VERSION")))
        }

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ PestGuard Commands ───────────────────────────────────────────╮

  DETECTION
    /detect <name=count,...>  Set detection results by hand
    /load <file>              Load a detection export (JSON)
    /results                  Show current detection results
    /analyze                  Ask for a review of the loaded export

  CONVERSATION
    /clear, /new              Start over (detection results are kept)
    /history                  Show the conversation so far
    /save                     Save the conversation
    /records                  List saved conversations

  OTHER
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit the application

  Ask about control, treatment or prevention and the current
  detection results are added to your question automatically.

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
