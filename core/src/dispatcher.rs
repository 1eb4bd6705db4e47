use crate::backend::{Backend, BackendError, BackendInfo};
use crate::command::{classify, Command};
use crate::config::Config;
use crate::events::{AppEvent, EventSender};
use crate::identity::{SessionIdentity, SessionStore};
use crate::masking::display_line;
use crate::navigation::{Navigator, BLOCKED_NOTICE};
use crate::tools::{render, render_failure, ToolRequest, ToolResult};
use crate::transcript::{Author, Block, Entry, EntryId, Transcript};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const WELCOME: &str =
    "Welcome to Lisbeth. Ask anything, or type / for session commands.";

const HELP_LINES: [&str; 6] = [
    "check password <password>   strength and breach check (input is masked)",
    "check email <address>       breach lookup for an address",
    "security news               latest security headlines",
    "surveillance                open a public camera feed",
    "search <name or handle>     OSINT search with a publicity score",
    "anything else               chat with the assistant",
];

/// Where the dispatch cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    /// At least one request is outstanding
    Sending,
    /// Transient: held only inside `settle` while an outcome is written into
    /// its placeholder. Never observable between calls.
    Rendering,
}

/// What happened to a submitted line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing but whitespace
    Ignored,
    /// A usage notice was rendered locally; no request was made
    UsageError(EntryId),
    /// A request is in flight for this placeholder
    Dispatched(EntryId),
    /// The line could not be sent; an error row explains why
    Rejected(EntryId),
}

/// Owns the transcript and drives every line through classify, mask,
/// dispatch and render. Lives on the UI task; network calls run in spawned
/// tasks that report back through the event bus.
pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    identity: SessionIdentity,
    navigator: Arc<dyn Navigator>,
    event_sender: EventSender,
    transcript: Transcript,
    phase: DispatchPhase,
    submit_enabled: bool,
    in_flight: HashMap<EntryId, CancellationToken>,
    request_timeout: Duration,
    navigation_delay: Duration,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn Backend>,
        store: Box<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        event_sender: EventSender,
        config: &Config,
    ) -> Self {
        Self {
            backend,
            identity: SessionIdentity::new(store),
            navigator,
            event_sender,
            transcript: Transcript::new(),
            phase: DispatchPhase::Idle,
            submit_enabled: true,
            in_flight: HashMap::new(),
            request_timeout: config.request_timeout,
            navigation_delay: config.navigation_delay,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn backend_info(&self) -> BackendInfo {
        self.backend.info()
    }

    /// Append the greeting row
    pub fn welcome(&mut self) {
        self.transcript.append(Entry::system(WELCOME.to_string()));
    }

    /// Submit one line of input
    pub fn submit(&mut self, raw: &str) -> SubmitOutcome {
        // classify never sees surrounding whitespace, so a bare "search " is chat
        let line = raw.trim();
        if line.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.transcript.append(Entry::user(display_line(line)));

        let command = match classify(line) {
            Ok(command) => command,
            Err(usage) => {
                debug!("Usage error for {}", usage.tool);
                let id = self.transcript.append(Entry::new(
                    Author::Tool(usage.tool),
                    vec![Block::Text(usage.to_string())],
                ));
                return SubmitOutcome::UsageError(id);
            }
        };

        let request = match command {
            Command::CheckPassword { secret } => ToolRequest::CheckPassword { password: secret },
            Command::CheckEmail { address } => ToolRequest::CheckEmail { email: address },
            Command::SecurityNews => ToolRequest::SecurityNews,
            Command::Surveillance => ToolRequest::Surveillance,
            // The chat endpoint parses the search query itself
            Command::Search { .. } => match self.user_id() {
                Ok(user_id) => ToolRequest::Search {
                    message: line.to_string(),
                    user_id,
                },
                Err(id) => return SubmitOutcome::Rejected(id),
            },
            Command::Chat { message } => match self.user_id() {
                Ok(user_id) => ToolRequest::Chat { message, user_id },
                Err(id) => return SubmitOutcome::Rejected(id),
            },
        };

        SubmitOutcome::Dispatched(self.dispatch(request))
    }

    /// Ask the backend what it remembers about this session
    pub fn recall_memory(&mut self) -> SubmitOutcome {
        self.transcript.append(Entry::user("/memory".to_string()));
        match self.user_id() {
            Ok(user_id) => SubmitOutcome::Dispatched(self.dispatch(ToolRequest::UserMemory { user_id })),
            Err(id) => SubmitOutcome::Rejected(id),
        }
    }

    /// Ask the backend to forget this session
    pub fn forget_memory(&mut self) -> SubmitOutcome {
        self.transcript.append(Entry::user("/forget".to_string()));
        match self.user_id() {
            Ok(user_id) => SubmitOutcome::Dispatched(self.dispatch(ToolRequest::ClearMemory { user_id })),
            Err(id) => SubmitOutcome::Rejected(id),
        }
    }

    fn user_id(&mut self) -> Result<String, EntryId> {
        self.identity.current().map_err(|e| {
            warn!("Session identifier unavailable: {}", e);
            self.transcript.append(Entry::new(
                Author::Error,
                vec![Block::Text(format!("could not load session identifier: {}", e))],
            ))
        })
    }

    fn dispatch(&mut self, request: ToolRequest) -> EntryId {
        let kind = request.kind();
        let entry = self.transcript.append(Entry::loading());
        let token = CancellationToken::new();
        self.in_flight.insert(entry, token.clone());
        self.submit_enabled = false;
        self.phase = DispatchPhase::Sending;
        info!("Dispatching {} request for {}", kind, entry);

        let backend = self.backend.clone();
        let sender = self.event_sender.clone();
        let timeout = self.request_timeout;
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => Err(BackendError::Cancelled),
                result = tokio::time::timeout(timeout, backend.send(request)) => {
                    result.unwrap_or_else(|_| Err(BackendError::Timeout(timeout)))
                }
            };
            if sender.send_settled(entry, outcome).is_err() {
                debug!("Event bus closed before {} settled", entry);
            }
        });

        entry
    }

    /// Write a settled outcome into its placeholder and re-enable submit.
    /// Outcomes for requests no longer tracked (cancelled by a new session)
    /// leave the submit gate and phase untouched.
    pub fn settle(&mut self, entry: EntryId, outcome: Result<ToolResult, BackendError>) {
        if self.in_flight.remove(&entry).is_none() {
            debug!("Dropping result for unknown entry {}", entry);
            return;
        }
        self.phase = DispatchPhase::Rendering;

        let rendering = match outcome {
            Ok(result) => render(result),
            Err(e) => {
                warn!("Request for {} failed: {}", entry, e);
                render_failure(&e)
            }
        };

        if self.transcript.replace(entry, rendering.content) {
            if let Some(url) = rendering.navigate {
                self.schedule_navigation(entry, url);
            }
        } else {
            debug!("Entry {} left the transcript before it settled", entry);
        }

        self.submit_enabled = true;
        self.phase = if self.in_flight.is_empty() {
            DispatchPhase::Idle
        } else {
            DispatchPhase::Sending
        };
    }

    fn schedule_navigation(&self, entry: EntryId, url: String) {
        let sender = self.event_sender.clone();
        let delay = self.navigation_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(AppEvent::Navigate { entry, url });
        });
    }

    /// Open a rendered link once its delay has elapsed
    pub fn navigate(&mut self, entry: EntryId, url: &str) {
        if self.transcript.get(entry).is_none() {
            debug!("Skipping navigation for cleared entry {}", entry);
            return;
        }
        if let Err(e) = self.navigator.open(url) {
            warn!("Navigation to {} failed: {}", url, e);
            self.transcript.amend(entry, Block::Notice(BLOCKED_NOTICE.to_string()));
        }
    }

    /// Open the most recent link in the transcript on demand
    pub fn open_last_link(&mut self) {
        let Some(url) = self.transcript.last_link().map(str::to_string) else {
            self.transcript
                .append(Entry::system("No link to open yet.".to_string()));
            return;
        };
        if let Err(e) = self.navigator.open(&url) {
            warn!("Navigation to {} failed: {}", url, e);
            self.transcript.append(Entry::new(
                Author::System,
                vec![Block::Notice(BLOCKED_NOTICE.to_string()), Block::Text(url)],
            ));
        }
    }

    /// Cancel every request still in flight. Each one settles as cancelled.
    pub fn cancel_in_flight(&mut self) -> usize {
        for token in self.in_flight.values() {
            token.cancel();
        }
        self.in_flight.len()
    }

    /// Forget the session: drop pending work, the transcript and the
    /// stored identifier
    pub fn new_session(&mut self) {
        for (_, token) in self.in_flight.drain() {
            token.cancel();
        }
        self.transcript.clear();
        self.submit_enabled = true;
        self.phase = DispatchPhase::Idle;

        match self.identity.reset() {
            Ok(()) => info!("Session identifier reset"),
            Err(e) => {
                warn!("Could not reset session identifier: {}", e);
                self.transcript.append(Entry::new(
                    Author::Error,
                    vec![Block::Text(format!("could not reset session identifier: {}", e))],
                ));
            }
        }
        self.welcome();
    }

    /// List the recognised tool commands
    pub fn help(&mut self) {
        let lines = HELP_LINES.iter().map(|line| line.to_string()).collect();
        self.transcript.append(Entry::new(
            Author::System,
            vec![Block::Caption("Commands:".to_string()), Block::Bullets(lines)],
        ));
    }
}
