use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The backend capabilities a line of input can address
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Password,
    Email,
    News,
    Surveillance,
    Osint,
    Chat,
    Memory,
}

impl ToolKind {
    /// Lead-in shown before a tool's output in the transcript
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Password => "🔐 Tool:",
            ToolKind::Email => "📧 Tool:",
            ToolKind::News => "📰 News:",
            ToolKind::Surveillance => "👁️ Tool:",
            ToolKind::Osint => "🔍 OSINT:",
            ToolKind::Chat => "root@wasp:",
            ToolKind::Memory => "🧠 Memory:",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolKind::Password => "password-check",
            ToolKind::Email => "email-check",
            ToolKind::News => "security-news",
            ToolKind::Surveillance => "surveillance",
            ToolKind::Osint => "osint-search",
            ToolKind::Chat => "chat",
            ToolKind::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Either the `{ "error": ... }` shape every endpoint may return, or the
/// endpoint's success payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiReply<T> {
    Failure { error: String },
    Success(T),
}

impl<T> ApiReply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiReply<U> {
        match self {
            ApiReply::Failure { error } => ApiReply::Failure { error },
            ApiReply::Success(value) => ApiReply::Success(f(value)),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ApiReply::Failure { .. })
    }
}

/// Breach lookup verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreachStatus {
    Compromised,
    Safe,
    Error,
    #[serde(other)]
    Unknown,
}

// Password check.
//
// One contract covers both the breach lookup (`status` + `found`) and the
// strength analysis (`score`, `strength`, `feedback`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordCheck {
    pub message: String,
    #[serde(default)]
    pub status: Option<BreachStatus>,
    #[serde(default)]
    pub found: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub feedback: Option<Vec<String>>,
}

impl PasswordCheck {
    /// Number of breaches the password appeared in, if the backend reported one
    pub fn occurrences(&self) -> Option<u64> {
        self.found.or(self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCheck {
    pub message: String,
    #[serde(default)]
    pub status: Option<BreachStatus>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub breaches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub published: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFeed {
    pub message: String,
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveillanceFeed {
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Tool tag attached to a chat reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatTool {
    PasswordChecker,
    EmailChecker,
    Surveillance,
    Osint,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub tool: Option<ChatTool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl ChatReply {
    /// Link to open when the backend routed the message to the surveillance tool
    pub fn surveillance_link(&self) -> Option<&str> {
        if self.tool != Some(ChatTool::Surveillance) {
            return None;
        }
        self.data.as_ref()?.get("link")?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsintHit {
    pub platform: String,
    pub url: String,
}

/// Search results carried on a chat reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsintReport {
    pub narrative: String,
    pub results: Vec<OsintHit>,
}

impl From<ChatReply> for OsintReport {
    fn from(reply: ChatReply) -> Self {
        let results = reply
            .data
            .as_ref()
            .and_then(|data| data.get("results"))
            .and_then(|results| serde_json::from_value::<Vec<OsintHit>>(results.clone()).ok())
            .unwrap_or_default();
        Self {
            narrative: reply.response,
            results,
        }
    }
}

/// Server-side conversational memory for one session identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub profile: Value,
    #[serde(default)]
    pub topics: Value,
    #[serde(default)]
    pub chat_history: Vec<Value>,
    #[serde(default)]
    pub conversation_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerNotice {
    pub message: String,
}

/// One outbound call, fully resolved from a line of input
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    CheckPassword { password: String },
    CheckEmail { email: String },
    SecurityNews,
    Surveillance,
    Search { message: String, user_id: String },
    Chat { message: String, user_id: String },
    UserMemory { user_id: String },
    ClearMemory { user_id: String },
}

impl ToolRequest {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolRequest::CheckPassword { .. } => ToolKind::Password,
            ToolRequest::CheckEmail { .. } => ToolKind::Email,
            ToolRequest::SecurityNews => ToolKind::News,
            ToolRequest::Surveillance => ToolKind::Surveillance,
            ToolRequest::Search { .. } => ToolKind::Osint,
            ToolRequest::Chat { .. } => ToolKind::Chat,
            ToolRequest::UserMemory { .. } | ToolRequest::ClearMemory { .. } => ToolKind::Memory,
        }
    }
}

/// Decoded backend answer, one variant per tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Password(ApiReply<PasswordCheck>),
    Email(ApiReply<EmailCheck>),
    News(ApiReply<NewsFeed>),
    Surveillance(ApiReply<SurveillanceFeed>),
    Osint(ApiReply<OsintReport>),
    Chat(ApiReply<ChatReply>),
    Memory(ApiReply<MemorySnapshot>),
    MemoryCleared(ApiReply<ServerNotice>),
}

impl ToolResult {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolResult::Password(_) => ToolKind::Password,
            ToolResult::Email(_) => ToolKind::Email,
            ToolResult::News(_) => ToolKind::News,
            ToolResult::Surveillance(_) => ToolKind::Surveillance,
            ToolResult::Osint(_) => ToolKind::Osint,
            ToolResult::Chat(_) => ToolKind::Chat,
            ToolResult::Memory(_) | ToolResult::MemoryCleared(_) => ToolKind::Memory,
        }
    }
}
