// Error types for kmodctl

use std::time::Duration;
use thiserror::Error;

/// Result type alias using anyhow::Error
pub type Result<T> = anyhow::Result<T>;

/// Failure of a single external command invocation
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' exited with {}: {stderr}", exit_code_text(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command '{command}' timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("Output of '{command}' does not mention '{pattern}'")]
    NoMatch { command: String, pattern: String },
}

impl CommandError {
    /// Whether re-issuing the same command could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CommandError::EmptyCommand | CommandError::Spawn { .. })
    }
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (killed by signal)".to_string(),
    }
}

/// kmodctl-specific error types
#[derive(Error, Debug)]
pub enum KmodError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Message catalog error: {0}")]
    Messages(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
