use pestguard_cli::commands::{handle_command, CommandResult};
use std::path::PathBuf;

// ========================================================================
// Basic slash commands
// ========================================================================

#[test]
fn test_help_command() {
    let result = handle_command("/help");
    assert!(matches!(result, CommandResult::Message(_)));

    if let CommandResult::Message(msg) = result {
        assert!(msg.contains("PestGuard Commands"));
        assert!(msg.contains("/detect"));
        assert!(msg.contains("/save"));
    }
}

#[test]
fn test_help_command_short_alias() {
    assert!(matches!(handle_command("/h"), CommandResult::Message(_)));
}

#[test]
fn test_quit_aliases() {
    for input in ["/exit", "/quit", "/q"] {
        assert!(matches!(handle_command(input), CommandResult::Quit), "{input}");
    }
}

#[test]
fn test_clear_and_new_reset_conversation() {
    assert!(matches!(handle_command("/clear"), CommandResult::Clear));
    assert!(matches!(handle_command("/new"), CommandResult::Clear));
}

#[test]
fn test_conversation_commands() {
    assert!(matches!(handle_command("/history"), CommandResult::ShowHistory));
    assert!(matches!(handle_command("/save"), CommandResult::SaveConversation));
    assert!(matches!(handle_command("/records"), CommandResult::ListConversations));
}

#[test]
fn test_version_command() {
    match handle_command("/version") {
        CommandResult::Message(msg) => assert!(msg.starts_with("PestGuard CLI v")),
        other => panic!("unexpected {other:?}"),
    }
}

// ========================================================================
// Detection commands
// ========================================================================

#[test]
fn test_detect_parses_counts_in_order() {
    match handle_command("/detect aphid=3, mite=1") {
        CommandResult::SetDetections(counts) => {
            assert_eq!(counts.iter().collect::<Vec<_>>(), vec![("aphid", 3), ("mite", 1)]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_detect_without_argument_shows_usage() {
    match handle_command("/detect") {
        CommandResult::Message(msg) => assert!(msg.contains("Usage: /detect")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_detect_with_bad_count_reports_error() {
    match handle_command("/detect aphid=many") {
        CommandResult::Message(msg) => assert!(msg.contains("Could not parse detections")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_load_takes_path() {
    match handle_command("/load  shots/leaf 01.json ") {
        CommandResult::LoadDetections(path) => {
            assert_eq!(path, PathBuf::from("shots/leaf 01.json"))
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(handle_command("/load"), CommandResult::Message(_)));
}

#[test]
fn test_results_and_analyze() {
    assert!(matches!(handle_command("/results"), CommandResult::ShowResults));
    assert!(matches!(handle_command("/analyze"), CommandResult::Analyze));
}

// ========================================================================
// Plain input and unknown commands
// ========================================================================

#[test]
fn test_plain_text_is_not_a_command() {
    assert!(matches!(
        handle_command("how do I control aphids?"),
        CommandResult::NotACommand
    ));
    assert!(matches!(handle_command("如何防治蚜虫"), CommandResult::NotACommand));
}

#[test]
fn test_unknown_command() {
    match handle_command("/spray") {
        CommandResult::Message(msg) => {
            assert!(msg.contains("Unknown command: /spray"));
            assert!(msg.contains("/help"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_surrounding_whitespace_is_ignored() {
    assert!(matches!(handle_command("  /quit  "), CommandResult::Quit));
}
