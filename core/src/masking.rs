//! Keeps password secrets out of everything the user can see.

use crate::command::{classify, strip_prefix_ci, Command, PASSWORD_PREFIX};
use regex::Regex;
use std::sync::OnceLock;

pub const MASK_CHAR: char = '*';

/// One mask character per character of `secret`
pub fn mask_secret(secret: &str) -> String {
    std::iter::repeat(MASK_CHAR).take(secret.chars().count()).collect()
}

/// The copy of a submitted line that goes into the transcript.
///
/// Password commands keep their prefix as typed and show the secret as a
/// mask of equal length. Everything else is shown as is.
pub fn display_line(line: &str) -> String {
    match classify(line) {
        Ok(Command::CheckPassword { secret }) => {
            let prefix = line.get(..PASSWORD_PREFIX.len()).unwrap_or(PASSWORD_PREFIX);
            format!("{} {}", prefix, mask_secret(&secret))
        }
        _ => line.to_string(),
    }
}

/// How the input buffer is echoed back while typing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    #[default]
    Plain,
    Hidden,
}

fn typing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)^(check password)(\s+)(\S.*)$").expect("password pattern is valid")
    })
}

impl EchoMode {
    /// `Hidden` once the keyword, a separator and at least one argument
    /// character have been typed.
    pub fn for_input(input: &str) -> Self {
        if typing_pattern().is_match(input) {
            EchoMode::Hidden
        } else {
            EchoMode::Plain
        }
    }
}

/// Read-only rendering of the input buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mirror {
    text: String,
    scroll: usize,
    echo: EchoMode,
}

impl Mirror {
    /// Recompute from the current buffer and the input's horizontal scroll offset
    pub fn sync(&mut self, input: &str, scroll: usize) {
        self.echo = EchoMode::for_input(input);
        self.text = match self.echo {
            EchoMode::Plain => input.to_string(),
            EchoMode::Hidden => mask_typed(input),
        };
        self.scroll = scroll;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.scroll = 0;
        self.echo = EchoMode::Plain;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn echo(&self) -> EchoMode {
        self.echo
    }

    /// The part of the mirror visible in a window `width` characters wide
    pub fn visible(&self, width: usize) -> String {
        self.text.chars().skip(self.scroll).take(width).collect()
    }
}

/// Prefix and separator stay readable, every later character is masked.
fn mask_typed(input: &str) -> String {
    let Some(rest) = strip_prefix_ci(input, PASSWORD_PREFIX) else {
        return input.to_string();
    };
    let separator_len = rest.len() - rest.trim_start().len();
    let (separator, secret) = rest.split_at(separator_len);
    format!(
        "{}{}{}",
        &input[..PASSWORD_PREFIX.len()],
        separator,
        mask_secret(secret)
    )
}
