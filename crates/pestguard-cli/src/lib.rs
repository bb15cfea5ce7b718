// Library interface for pestguard-cli, so integration tests can reach the
// command parser and the prompt console. Both files are also declared in
// main.rs, hence the path attributes.

#[path = "commands.rs"]
pub mod commands;

#[path = "console.rs"]
pub mod console;

pub use commands::{handle_command, CommandResult};
