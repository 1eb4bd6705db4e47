//! Turns decoded backend answers into transcript content.

use super::types::*;
use crate::backend::BackendError;
use crate::transcript::{Author, Block, EntryContent, Inline, Tile};
use serde_json::Value;

const PUBLICITY_MARKER: &str = "publicity score";

/// Transcript content for a settled dispatch, plus an optional link the
/// client should navigate to after the configured delay
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    pub content: EntryContent,
    pub navigate: Option<String>,
}

impl Rendering {
    fn new(author: Author, blocks: Vec<Block>) -> Self {
        Self {
            content: EntryContent { author, blocks },
            navigate: None,
        }
    }

    fn tool(kind: ToolKind, blocks: Vec<Block>) -> Self {
        Self::new(Author::Tool(kind), blocks)
    }

    fn tool_error(kind: ToolKind, error: String) -> Self {
        Self::tool(kind, vec![Block::Error(error)])
    }

    fn navigate_to(mut self, link: Option<String>) -> Self {
        self.navigate = link;
        self
    }
}

/// Render any tool result
pub fn render(result: ToolResult) -> Rendering {
    match result {
        ToolResult::Password(reply) => render_password(reply),
        ToolResult::Email(reply) => render_email(reply),
        ToolResult::News(reply) => render_news(reply),
        ToolResult::Surveillance(reply) => render_surveillance(reply),
        ToolResult::Osint(reply) => render_osint(reply),
        ToolResult::Chat(reply) => render_chat(reply),
        ToolResult::Memory(reply) => render_memory(reply),
        ToolResult::MemoryCleared(reply) => match reply {
            ApiReply::Failure { error } => Rendering::tool_error(ToolKind::Memory, error),
            ApiReply::Success(notice) => {
                Rendering::tool(ToolKind::Memory, vec![Block::Text(notice.message)])
            }
        },
    }
}

/// Render a transport, status, decode, timeout or cancellation failure
pub fn render_failure(error: &BackendError) -> Rendering {
    Rendering::new(Author::Error, vec![Block::Text(error.to_string())])
}

pub fn render_password(reply: ApiReply<PasswordCheck>) -> Rendering {
    let check = match reply {
        ApiReply::Failure { error } => return Rendering::tool_error(ToolKind::Password, error),
        ApiReply::Success(check) => check,
    };

    let mut blocks = vec![Block::Text(check.message.clone())];
    if check.status == Some(BreachStatus::Compromised) {
        if let Some(occurrences) = check.occurrences() {
            blocks.push(Block::Text(format!("Breaches found: {}", occurrences)));
        }
    }
    if let Some(feedback) = check.feedback {
        let mut summary = Vec::new();
        if let Some(score) = check.score {
            summary.push(format!("Score: {}/100", score));
        }
        if let Some(strength) = check.strength {
            summary.push(format!("Strength: {}", strength));
        }
        if !summary.is_empty() {
            blocks.push(Block::Text(summary.join("\n")));
        }
        blocks.push(Block::Caption("Feedback:".to_string()));
        blocks.push(Block::Bullets(feedback));
    }
    Rendering::tool(ToolKind::Password, blocks)
}

pub fn render_email(reply: ApiReply<EmailCheck>) -> Rendering {
    let check = match reply {
        ApiReply::Failure { error } => return Rendering::tool_error(ToolKind::Email, error),
        ApiReply::Success(check) => check,
    };

    let mut blocks = vec![Block::Text(check.message)];
    if check.status == Some(BreachStatus::Compromised) && check.count > 0 {
        blocks.push(Block::Text(format!("Breaches found: {}", check.count)));
        blocks.push(Block::Caption("Breach names:".to_string()));
        blocks.push(Block::Bullets(check.breaches));
    }
    Rendering::tool(ToolKind::Email, blocks)
}

pub fn render_news(reply: ApiReply<NewsFeed>) -> Rendering {
    let feed = match reply {
        ApiReply::Failure { error } => return Rendering::tool_error(ToolKind::News, error),
        ApiReply::Success(feed) => feed,
    };

    let items = feed
        .news
        .into_iter()
        .map(|item| {
            vec![
                item.title,
                format!("Source: {}", item.source),
                format!("Date: {}", item.published),
                format!("Link: {}", item.link),
            ]
        })
        .collect();
    Rendering::tool(
        ToolKind::News,
        vec![Block::Headline(feed.message), Block::Numbered(items)],
    )
}

pub fn render_surveillance(reply: ApiReply<SurveillanceFeed>) -> Rendering {
    let feed = match reply {
        ApiReply::Failure { error } => return Rendering::tool_error(ToolKind::Surveillance, error),
        ApiReply::Success(feed) => feed,
    };

    let text = match feed.link.as_deref() {
        Some(link) if !link.is_empty() => link_inlines(&feed.message, link),
        _ => vec![Inline::Plain(feed.message.clone())],
    };
    Rendering::tool(ToolKind::Surveillance, vec![Block::Rich(text)])
        .navigate_to(feed.link.filter(|link| !link.is_empty()))
}

/// Split `message` around every occurrence of `link`. A link the message
/// never mentions is appended after it.
fn link_inlines(message: &str, link: &str) -> Vec<Inline> {
    if link.is_empty() {
        return vec![Inline::Plain(message.to_string())];
    }
    let mut parts = Vec::new();
    let mut rest = message;
    while let Some(pos) = rest.find(link) {
        if pos > 0 {
            parts.push(Inline::Plain(rest[..pos].to_string()));
        }
        parts.push(Inline::Link(link.to_string()));
        rest = &rest[pos + link.len()..];
    }
    if !rest.is_empty() {
        parts.push(Inline::Plain(rest.to_string()));
    }
    if !parts.iter().any(|part| matches!(part, Inline::Link(_))) {
        parts.push(Inline::Plain(" ".to_string()));
        parts.push(Inline::Link(link.to_string()));
    }
    parts
}

pub fn render_osint(reply: ApiReply<OsintReport>) -> Rendering {
    let report = match reply {
        ApiReply::Failure { error } => {
            return Rendering::tool_error(ToolKind::Osint, format!("OSINT search failed: {}", error))
        }
        ApiReply::Success(report) => report,
    };

    let (headline, body) = split_publicity_score(&report.narrative);
    let mut blocks = Vec::new();
    if let Some(headline) = headline {
        blocks.push(Block::Headline(headline));
    }
    if !body.is_empty() {
        blocks.push(Block::Text(body));
    }
    if !report.results.is_empty() {
        blocks.push(Block::Tiles(
            report
                .results
                .into_iter()
                .map(|hit| Tile { label: hit.platform, url: hit.url })
                .collect(),
        ));
    }
    Rendering::tool(ToolKind::Osint, blocks)
}

/// Lift the first line mentioning the publicity score out of `text`.
/// Returns the trimmed line and the remaining text.
pub fn split_publicity_score(text: &str) -> (Option<String>, String) {
    let mut headline = None;
    let mut body = Vec::new();
    for line in text.lines() {
        if headline.is_none() && line.to_lowercase().contains(PUBLICITY_MARKER) {
            headline = Some(line.trim().to_string());
        } else {
            body.push(line);
        }
    }
    (headline, body.join("\n").trim().to_string())
}

pub fn render_chat(reply: ApiReply<ChatReply>) -> Rendering {
    let reply = match reply {
        ApiReply::Failure { error } => return Rendering::new(Author::Error, vec![Block::Text(error)]),
        ApiReply::Success(reply) => reply,
    };

    let navigate = reply
        .surveillance_link()
        .filter(|link| !link.is_empty())
        .map(str::to_string);
    let mut blocks = Vec::new();
    if let Some(link) = navigate.as_deref() {
        blocks.push(Block::Rich(link_inlines(&reply.response, link)));
    } else if !reply.response.is_empty() {
        blocks.push(Block::Text(reply.response));
    }
    if let Some(options) = reply.options.filter(|options| !options.is_empty()) {
        blocks.push(Block::Caption("Options:".to_string()));
        blocks.push(Block::Lettered(options));
    }
    Rendering::tool(ToolKind::Chat, blocks).navigate_to(navigate)
}

pub fn render_memory(reply: ApiReply<MemorySnapshot>) -> Rendering {
    let snapshot = match reply {
        ApiReply::Failure { error } => return Rendering::tool_error(ToolKind::Memory, error),
        ApiReply::Success(snapshot) => snapshot,
    };

    let mut blocks = vec![Block::Text(format!(
        "Conversations so far: {} ({} messages remembered)",
        snapshot.conversation_count,
        snapshot.chat_history.len()
    ))];
    let profile = describe_object(&snapshot.profile);
    if !profile.is_empty() {
        blocks.push(Block::Caption("Profile:".to_string()));
        blocks.push(Block::Bullets(profile));
    }
    let topics = describe_object(&snapshot.topics);
    if !topics.is_empty() {
        blocks.push(Block::Caption("Topics:".to_string()));
        blocks.push(Block::Bullets(topics));
    }
    Rendering::tool(ToolKind::Memory, blocks)
}

/// `key: value` lines for the non-empty members of a JSON object
fn describe_object(value: &Value) -> Vec<String> {
    let Some(map) = value.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) if s.is_empty() => return None,
                Value::Array(items) if items.is_empty() => return None,
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            Some(format!("{}: {}", key, text))
        })
        .collect()
}
