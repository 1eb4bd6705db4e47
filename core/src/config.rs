use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NAV_DELAY_MS: u64 = 1500;

/// Runtime settings for the client
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root the backend endpoints are resolved against
    pub base_url: Url,
    /// Upper bound on one dispatch, including decoding
    pub request_timeout: Duration,
    /// Pause before a surveillance link is opened
    pub navigation_delay: Duration,
    /// Client storage and other local state
    pub data_dir: PathBuf,
    /// Whether links may be opened in the system browser
    pub open_links: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            navigation_delay: Duration::from_millis(DEFAULT_NAV_DELAY_MS),
            data_dir: default_data_dir(),
            open_links: true,
        }
    }
}

impl Config {
    /// Build from `LISBETH_*` environment variables, falling back to defaults.
    /// Optional: LISBETH_BASE_URL, LISBETH_TIMEOUT_SECS, LISBETH_NAV_DELAY_MS,
    /// LISBETH_HOME, LISBETH_OPEN_LINKS
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("LISBETH_BASE_URL") {
            config.base_url = parse_base_url(&raw).map_err(|reason| ConfigError::Invalid {
                var: "LISBETH_BASE_URL",
                reason,
            })?;
        }
        if let Some(raw) = lookup("LISBETH_TIMEOUT_SECS") {
            let secs = parse_u64("LISBETH_TIMEOUT_SECS", &raw)?;
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(raw) = lookup("LISBETH_NAV_DELAY_MS") {
            config.navigation_delay = Duration::from_millis(parse_u64("LISBETH_NAV_DELAY_MS", &raw)?);
        }
        if let Some(raw) = lookup("LISBETH_HOME").filter(|raw| !raw.trim().is_empty()) {
            config.data_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("LISBETH_OPEN_LINKS") {
            config.open_links = parse_bool("LISBETH_OPEN_LINKS", &raw)?;
        }
        Ok(config)
    }

    /// Location of the client storage file
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(raw).map_err(|reason| ConfigError::Invalid {
            var: "--base-url",
            reason,
        })?;
        Ok(self)
    }
}

/// Parse a base URL, accepting only http and https
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    Ok(url)
}

fn parse_u64(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

/// Default data directory (~/.lisbeth)
pub fn default_data_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    let mut path: PathBuf = home.into();
    path.push(".lisbeth");
    path
}
