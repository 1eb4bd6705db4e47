//! Turns a line of free text into the tool it addresses.

use crate::tools::ToolKind;
use thiserror::Error;

pub const PASSWORD_PREFIX: &str = "check password";
pub const EMAIL_PREFIX: &str = "check email";
pub const SEARCH_PREFIX: &str = "search ";
const NEWS_PREFIXES: [&str; 2] = ["security news", "hacker news"];
const SURVEILLANCE_WORDS: [&str; 2] = ["surveillance", "survelliance"];

/// A classified line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CheckPassword { secret: String },
    CheckEmail { address: String },
    SecurityNews,
    Surveillance,
    Search { query: String },
    Chat { message: String },
}

impl Command {
    pub fn kind(&self) -> ToolKind {
        match self {
            Command::CheckPassword { .. } => ToolKind::Password,
            Command::CheckEmail { .. } => ToolKind::Email,
            Command::SecurityNews => ToolKind::News,
            Command::Surveillance => ToolKind::Surveillance,
            Command::Search { .. } => ToolKind::Osint,
            Command::Chat { .. } => ToolKind::Chat,
        }
    }
}

/// A recognised command whose required argument is missing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Usage: {usage}")]
pub struct UsageError {
    pub tool: ToolKind,
    pub usage: &'static str,
}

impl UsageError {
    fn for_tool(tool: ToolKind) -> Self {
        let usage = match tool {
            ToolKind::Password => "check password yourpassword",
            ToolKind::Email => "check email your_email@example.com",
            _ => "search <name or handle>",
        };
        Self { tool, usage }
    }
}

/// Classify a line. First match wins, in the order password, email, news,
/// surveillance, search, and otherwise chat.
pub fn classify(line: &str) -> Result<Command, UsageError> {
    let lower = line.to_lowercase();

    if let Some(rest) = strip_prefix_ci(line, PASSWORD_PREFIX) {
        return non_empty(rest, ToolKind::Password).map(|secret| Command::CheckPassword { secret });
    }
    if let Some(rest) = strip_prefix_ci(line, EMAIL_PREFIX) {
        return non_empty(rest, ToolKind::Email).map(|address| Command::CheckEmail { address });
    }
    if NEWS_PREFIXES.iter().any(|prefix| strip_prefix_ci(line, prefix).is_some()) {
        return Ok(Command::SecurityNews);
    }
    if SURVEILLANCE_WORDS.iter().any(|word| lower.contains(word)) {
        return Ok(Command::Surveillance);
    }
    if let Some(rest) = strip_prefix_ci(line, SEARCH_PREFIX) {
        return non_empty(rest, ToolKind::Osint).map(|query| Command::Search { query });
    }

    Ok(Command::Chat {
        message: line.to_string(),
    })
}

/// Strip an ASCII prefix case-insensitively, returning the case-preserved remainder.
pub(crate) fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

fn non_empty(rest: &str, tool: ToolKind) -> Result<String, UsageError> {
    let arg = rest.trim();
    if arg.is_empty() {
        Err(UsageError::for_tool(tool))
    } else {
        Ok(arg.to_string())
    }
}
