use super::{Backend, BackendError, BackendInfo};
use crate::tools::*;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use url::Url;

const CAMERA_FEED: &str = "http://www.insecam.org/en/view/365340/";

/// Offline backend with canned answers, scripted overrides and a call log
pub struct MockBackend {
    info: BackendInfo,
    delay: Duration,
    delays: HashMap<ToolKind, Duration>,
    scripted: Mutex<HashMap<ToolKind, VecDeque<Result<ToolResult, BackendError>>>>,
    calls: Arc<Mutex<Vec<ToolRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            info: BackendInfo {
                name: "Mock backend".to_string(),
                description: "Canned offline answers for every tool".to_string(),
                endpoint: "mock://offline".to_string(),
            },
            delay: Duration::from_millis(300), // Simulate network latency
            delays: HashMap::new(),
            scripted: Mutex::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Latency for one tool only
    pub fn with_delay_for(mut self, kind: ToolKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    /// Queue an answer for the next call to `kind`, ahead of the canned one
    pub fn with_response(self, kind: ToolKind, response: Result<ToolResult, BackendError>) -> Self {
        lock(&self.scripted).entry(kind).or_default().push_back(response);
        self
    }

    /// Shared handle on every request received so far
    pub fn call_log(&self) -> Arc<Mutex<Vec<ToolRequest>>> {
        self.calls.clone()
    }

    pub fn calls(&self) -> Vec<ToolRequest> {
        lock(&self.calls).clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Backend for MockBackend {
    async fn send(&self, request: ToolRequest) -> Result<ToolResult, BackendError> {
        let kind = request.kind();
        lock(&self.calls).push(request.clone());

        let delay = self.delays.get(&kind).copied().unwrap_or(self.delay);
        tokio::time::sleep(delay).await;

        let scripted = lock(&self.scripted).get_mut(&kind).and_then(VecDeque::pop_front);
        match scripted {
            Some(response) => response,
            None => canned(request),
        }
    }

    fn info(&self) -> BackendInfo {
        self.info.clone()
    }
}

fn canned(request: ToolRequest) -> Result<ToolResult, BackendError> {
    let result = match request {
        ToolRequest::CheckPassword { password } => {
            ToolResult::Password(ApiReply::Success(analyze_strength(&password)))
        }
        ToolRequest::CheckEmail { email } => {
            let check = if email.to_lowercase().contains("pwned") {
                EmailCheck {
                    message: format!("🚨 {} appeared in known data breaches!", email),
                    status: Some(BreachStatus::Compromised),
                    count: 2,
                    breaches: vec!["Adobe".to_string(), "LinkedIn".to_string()],
                }
            } else {
                EmailCheck {
                    message: format!("✅ Good news! {} wasn't found in any known breaches.", email),
                    status: Some(BreachStatus::Safe),
                    count: 0,
                    breaches: Vec::new(),
                }
            };
            ToolResult::Email(ApiReply::Success(check))
        }
        ToolRequest::SecurityNews => ToolResult::News(ApiReply::Success(NewsFeed {
            message: "📰 Latest cybersecurity news (2 stories)".to_string(),
            news: vec![
                NewsItem {
                    title: "Ransomware gang leaks stolen data".to_string(),
                    source: "BleepingComputer".to_string(),
                    published: "2025-01-14".to_string(),
                    link: "https://www.bleepingcomputer.com/".to_string(),
                },
                NewsItem {
                    title: "Zero-day exploit patched in popular VPN".to_string(),
                    source: "Krebs on Security".to_string(),
                    published: "2025-01-13".to_string(),
                    link: "https://krebsonsecurity.com/".to_string(),
                },
            ],
        })),
        ToolRequest::Surveillance => ToolResult::Surveillance(ApiReply::Success(SurveillanceFeed {
            message: format!("👁️ Accessing surveillance feed... Found one: {}", CAMERA_FEED),
            link: Some(CAMERA_FEED.to_string()),
        })),
        ToolRequest::Search { message, .. } => {
            let target = message
                .get("search ".len()..)
                .unwrap_or_default()
                .trim()
                .to_string();
            ToolResult::Osint(ApiReply::Success(dork_report(&target)))
        }
        ToolRequest::Chat { message, .. } => {
            if message.trim().eq_ignore_ascii_case("network error") {
                return Err(BackendError::Network("Simulated network failure".to_string()));
            }
            ToolResult::Chat(ApiReply::Success(ChatReply {
                response: format!("Response to: {}", message),
                ..ChatReply::default()
            }))
        }
        ToolRequest::UserMemory { user_id } => ToolResult::Memory(ApiReply::Success(MemorySnapshot {
            profile: json!({ "user_id": user_id }),
            topics: json!({}),
            chat_history: Vec::new(),
            conversation_count: 0,
        })),
        ToolRequest::ClearMemory { user_id } => ToolResult::MemoryCleared(ApiReply::Success(ServerNotice {
            message: format!("Memory cleared for user {}", user_id),
        })),
    };
    Ok(result)
}

/// Local strength heuristic standing in for the password endpoint
fn analyze_strength(password: &str) -> PasswordCheck {
    let mut score: i32 = 0;
    let mut feedback = Vec::new();
    let length = password.chars().count();

    score += match length {
        16.. => 25,
        12..=15 => 20,
        8..=11 => 10,
        _ => {
            feedback.push("❌ Password too short (min 12 chars)".to_string());
            0
        }
    };
    let classes: [(&str, fn(&char) -> bool, i32); 4] = [
        ("❌ No lowercase letters", char::is_ascii_lowercase, 15),
        ("❌ No uppercase letters", char::is_ascii_uppercase, 15),
        ("❌ No numbers", char::is_ascii_digit, 15),
        ("❌ No special characters", char::is_ascii_punctuation, 20),
    ];
    for (missing, present, points) in classes {
        if password.chars().any(|c| present(&c)) {
            score += points;
        } else {
            feedback.push(missing.to_string());
        }
    }
    let chars: Vec<char> = password.chars().collect();
    if chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]) {
        score -= 10;
        feedback.push("⚠️ Repeating characters detected".to_string());
    }
    let lower = password.to_lowercase();
    if ["password", "123456", "qwerty", "admin", "letmein"]
        .iter()
        .any(|pattern| lower.contains(pattern))
    {
        score -= 15;
        feedback.push("⚠️ Contains common patterns".to_string());
    }

    let score = score.clamp(0, 100) as u32;
    let (strength, emoji) = match score {
        80.. => ("STRONG", "✅"),
        60..=79 => ("MEDIUM", "⚠️"),
        _ => ("WEAK", "🚨"),
    };
    if feedback.is_empty() {
        feedback.push("✅ Good password!".to_string());
    }
    PasswordCheck {
        message: format!("{} Password strength: {} ({}/100)", emoji, strength, score),
        status: None,
        found: None,
        count: None,
        score: Some(score),
        strength: Some(strength.to_string()),
        feedback: Some(feedback),
    }
}

fn dork_report(target: &str) -> OsintReport {
    let dorks = [
        ("Facebook", format!("site:facebook.com \"{}\"", target)),
        ("LinkedIn", format!("site:linkedin.com/in/ \"{}\"", target)),
        ("Instagram", format!("site:instagram.com \"{}\"", target)),
        ("Twitter/X", format!("site:twitter.com \"{}\"", target)),
        ("Public Documents", format!("site:docs.google.com \"{}\"", target)),
    ];
    let results = dorks
        .into_iter()
        .filter_map(|(platform, dork)| {
            let url = Url::parse_with_params("https://www.google.com/search", &[("q", dork)]).ok()?;
            Some(OsintHit {
                platform: platform.to_string(),
                url: url.to_string(),
            })
        })
        .collect();
    OsintReport {
        narrative: format!(
            "🔍 Generated OSINT dorks for: {}\nPUBLICITY SCORE: unknown (offline)\nOpen the links below to look for public traces.",
            target
        ),
        results,
    }
}
