//! Command outcomes, their printed form and the process exit status.
//!
//! stdout carries only `OK`, `ERROR: ...` and record listings; logs go to
//! stderr.

use pdd_core::{Error, RecordEntry};
use std::process::ExitCode;

/// Exit codes
///
/// Usage errors are reported by clap with its own status before any
/// command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PddctlExitCode {
    /// Command succeeded
    Success = 0,
    /// Command failed (registrar error, timeout, bad arguments, ...)
    Failure = 1,
}

impl From<PddctlExitCode> for ExitCode {
    fn from(code: PddctlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Result of running one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The change was accepted (and confirmed, with `--sync`)
    Done,
    /// Records to print, one per line
    Listed(Vec<String>),
    /// Message printed after `ERROR: `
    Failed(String),
}

impl CommandOutcome {
    /// Failure carrying a core error
    pub fn from_error(error: &Error) -> Self {
        CommandOutcome::Failed(error_message(error))
    }

    /// Lines written to stdout
    pub fn lines(&self) -> Vec<String> {
        match self {
            CommandOutcome::Done => vec!["OK".to_string()],
            CommandOutcome::Listed(lines) => lines.clone(),
            CommandOutcome::Failed(message) => vec![format!("ERROR: {}", message)],
        }
    }

    /// Print the outcome to stdout
    pub fn report(&self) {
        for line in self.lines() {
            println!("{}", line);
        }
    }

    pub fn exit_code(&self) -> PddctlExitCode {
        match self {
            CommandOutcome::Done | CommandOutcome::Listed(_) => PddctlExitCode::Success,
            CommandOutcome::Failed(_) => PddctlExitCode::Failure,
        }
    }
}

/// Text shown to the user for an error
///
/// Registrar rejections show the registrar's own message.
pub fn error_message(error: &Error) -> String {
    match error {
        Error::Registrar { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// One listing line: `ID SUBDOMAIN TYPE TTL [PRIORITY] CONTENT`
///
/// The priority column is only present for MX and SRV records; `-` stands
/// for a priority the registrar did not report.
pub fn format_entry(entry: &RecordEntry) -> String {
    match entry.record_type.as_str() {
        "MX" | "SRV" => format!(
            "{} {} {} {} {} {}",
            entry.id,
            entry.subdomain,
            entry.record_type,
            entry.ttl,
            format_priority(entry.priority.as_ref()),
            entry.content
        ),
        _ => format!(
            "{} {} {} {} {}",
            entry.id, entry.subdomain, entry.record_type, entry.ttl, entry.content
        ),
    }
}

fn format_priority(priority: Option<&serde_json::Value>) -> String {
    match priority {
        None | Some(serde_json::Value::Null) => "-".to_string(),
        Some(serde_json::Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
