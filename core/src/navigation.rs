use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Notice shown when a link could not be opened for the user
pub const BLOCKED_NOTICE: &str = "Pop-up blocked! Open the link above manually.";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavigationError {
    #[error("refusing to open '{0}': only http and https links are opened")]
    UnsupportedLink(String),

    #[error("opening links is disabled")]
    Disabled,

    #[error("failed to open link: {0}")]
    Failed(String),
}

/// Opens a link in a view separate from the chat
pub trait Navigator: Send + Sync {
    fn open(&self, url: &str) -> Result<(), NavigationError>;
}

/// Hands links to the desktop's default browser
#[derive(Debug, Default, Clone)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open(&self, url: &str) -> Result<(), NavigationError> {
        let parsed = checked_link(url)?;
        debug!("Opening {} in the system browser", parsed);
        open::that(parsed.as_str()).map_err(|e| {
            warn!("Could not open {}: {}", parsed, e);
            NavigationError::Failed(e.to_string())
        })
    }
}

/// Used when link opening is switched off; every attempt is refused
#[derive(Debug, Default, Clone)]
pub struct DisabledNavigator;

impl Navigator for DisabledNavigator {
    fn open(&self, url: &str) -> Result<(), NavigationError> {
        checked_link(url)?;
        Err(NavigationError::Disabled)
    }
}

/// Accept only absolute http(s) links
pub fn checked_link(raw: &str) -> Result<Url, NavigationError> {
    let url = Url::parse(raw.trim()).map_err(|_| NavigationError::UnsupportedLink(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(NavigationError::UnsupportedLink(raw.to_string())),
    }
}
