use anyhow::{bail, Result};
use pestguard_core::{
    AssistantReply, ConversationSession, DetectionExport, DetectionReport, PestGuardError,
    Settings, TranscriptStore,
};

use crate::commands::{self, CommandResult};
use crate::console::Console;

type StdConsole = Console<tokio::io::BufReader<tokio::io::Stdin>, std::io::Stdout>;

const MAX_LOGIN_ATTEMPTS: usize = 3;

// ── Accounts ────────────────────────────────────────────────────────────

pub async fn run_login(settings: &Settings) -> Result<()> {
    let mut console = Console::stdio();
    let username = login(settings, &mut console).await?;
    println!("Welcome, {username}.");
    Ok(())
}

async fn login(settings: &Settings, console: &mut StdConsole) -> Result<String> {
    let store = settings.credential_store();

    for attempt in 1..=MAX_LOGIN_ATTEMPTS {
        let Some([username, password]) = console
            .ask_all(&["Username: ", "Password: "])
            .await?
            .and_then(|answers| <[String; 2]>::try_from(answers).ok())
        else {
            bail!("input closed before login");
        };

        if store.validate(username.trim(), &password) {
            return Ok(username.trim().to_string());
        }
        tracing::debug!(attempt, "login rejected");
        eprintln!("Wrong username or password ({attempt}/{MAX_LOGIN_ATTEMPTS}).");
    }
    bail!("too many failed login attempts")
}

pub async fn run_register(settings: &Settings) -> Result<()> {
    let mut console = Console::stdio();
    let store = settings.credential_store();

    let Some([username, password, confirmation]) = console
        .ask_all(&["Username: ", "Password: ", "Confirm password: "])
        .await?
        .and_then(|answers| <[String; 3]>::try_from(answers).ok())
    else {
        bail!("input closed before registration finished");
    };

    match store.register_with_confirmation(&username, &password, &confirmation) {
        Ok(()) => {
            println!("Registered '{}'. You can now log in.", username.trim());
            Ok(())
        }
        Err(
            e @ (PestGuardError::InvalidInput(_)
            | PestGuardError::AlreadyExists(_)
            | PestGuardError::PasswordMismatch),
        ) => {
            eprintln!("Registration failed: {e}");
            Ok(())
        }
        Err(e) => {
            tracing::error!("registration failed: {e}");
            Err(e.into())
        }
    }
}

// ── Chat ────────────────────────────────────────────────────────────────

pub async fn run_chat(settings: &Settings) -> Result<()> {
    let mut console = Console::stdio();
    let username = login(settings, &mut console).await?;

    let client = settings.build_llm_client()?;
    let mut session = ConversationSession::new(client, settings.session_options());
    let store = TranscriptStore::new(&settings.assistant.records_dir);
    let mut last_report: Option<DetectionReport> = None;

    println!(
        "Hi {username}, I'm the pest control assistant ({}). Type /help for commands.",
        settings.llm.model
    );

    loop {
        let Some(line) = console.ask("\n> ").await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let command = commands::handle_command(input);
        tracing::debug!(?command, "dispatching input");

        match command {
            CommandResult::NotACommand => match session.chat(input, true).await {
                Ok(reply) => println!("{}", AssistantReply::parse(&reply).render()),
                Err(e) => {
                    tracing::warn!(transport = e.is_transport(), "chat turn failed");
                    eprintln!("{e}");
                }
            },
            CommandResult::Message(msg) => println!("{msg}"),
            CommandResult::Quit => break,
            CommandResult::Clear => {
                session.reset();
                println!("Conversation cleared.");
            }
            CommandResult::SetDetections(counts) => {
                session.set_detection_results(counts);
                print_results(&session);
            }
            CommandResult::LoadDetections(path) => match DetectionExport::load(&path) {
                Ok(export) => {
                    let report = export.report();
                    session.set_detection_results(report.distribution.clone());
                    println!(
                        "Loaded {} detections from {}.",
                        report.total_objects,
                        path.display()
                    );
                    print_results(&session);
                    last_report = Some(report);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "detection export not loaded");
                    eprintln!("{e}");
                }
            },
            CommandResult::ShowResults => print_results(&session),
            CommandResult::Analyze => match &last_report {
                Some(report) => match session.analyze_report(report).await {
                    Ok(analysis) => println!("{}", AssistantReply::parse(&analysis).render()),
                    Err(e) => eprintln!("{e}"),
                },
                None => println!("Nothing to analyze. Load a detection export with /load first."),
            },
            CommandResult::ShowHistory => {
                let transcript = session.transcript();
                if transcript.is_empty() {
                    println!("No messages yet.");
                } else {
                    println!("{transcript}");
                }
            }
            CommandResult::SaveConversation => match store.save(&session) {
                Ok(id) => println!("Conversation saved ({id})."),
                Err(e) => eprintln!("Could not save conversation: {e}"),
            },
            CommandResult::ListConversations => match store.list() {
                Ok(records) if records.is_empty() => println!("No saved conversations."),
                Ok(records) => {
                    for record in records {
                        println!(
                            "{}  {}  {} messages",
                            record.saved_at.format("%Y-%m-%d %H:%M"),
                            record.id,
                            record.messages.len()
                        );
                    }
                }
                Err(e) => eprintln!("Could not list conversations: {e}"),
            },
        }
    }

    Ok(())
}

fn print_results(session: &ConversationSession) {
    let results = session.detection_results();
    if !results.is_empty() {
        println!(
            "{} objects in {} categories.",
            results.total(),
            results.len()
        );
    }
    println!("{}", session.detection_context());
}
