use lisbeth_core::{AppEvent, Dispatcher, Mirror};
use std::time::Instant;
use tokio::sync::mpsc;

/// Entry in the command palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteCommand {
    pub name: &'static str,
    pub description: &'static str,
}

pub static PALETTE_COMMANDS: [PaletteCommand; 5] = [
    PaletteCommand {
        name: "/new",
        description: "Start a new session: clear the transcript and forget the session identifier",
    },
    PaletteCommand {
        name: "/memory",
        description: "Show what the assistant remembers about this session",
    },
    PaletteCommand {
        name: "/forget",
        description: "Ask the assistant to forget this session",
    },
    PaletteCommand {
        name: "/help",
        description: "List the tool commands",
    },
    PaletteCommand {
        name: "/quit",
        description: "Exit the application",
    },
];

/// Panel receiving navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Transcript,
}

/// Application state
pub struct AppState {
    /// Owns the transcript and every in-flight request
    pub dispatcher: Dispatcher,

    /// Event receiver for handling app events
    pub event_receiver: mpsc::UnboundedReceiver<AppEvent>,

    /// Current input text. Never drawn directly; the mirror is.
    pub input: String,

    /// Cursor position in input text (byte index)
    pub input_cursor: usize,

    /// First visible character of the input line
    pub input_scroll: usize,

    /// Characters that fit in the input line, updated on every draw
    pub input_width: usize,

    /// What the user sees of the input
    pub mirror: Mirror,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Transcript scroll state
    pub chat_scroll: usize,

    /// Whether to auto-scroll the transcript to bottom on new rows
    pub auto_scroll_chat: bool,

    pub focus: Focus,

    /// Whether cursor is visible (for blinking effect)
    pub cursor_visible: bool,

    /// Last time cursor blinked
    pub last_cursor_blink: Instant,

    /// Command palette state
    pub command_palette_open: bool,

    /// Currently selected command in palette
    pub command_palette_selected: usize,

    /// Filter text for command palette
    pub command_palette_filter: String,
}

impl AppState {
    /// Create a new application state
    pub fn new(mut dispatcher: Dispatcher, event_receiver: mpsc::UnboundedReceiver<AppEvent>) -> Self {
        if dispatcher.transcript().is_empty() {
            dispatcher.welcome();
        }
        Self {
            dispatcher,
            event_receiver,
            input: String::new(),
            input_cursor: 0,
            input_scroll: 0,
            input_width: 80,
            mirror: Mirror::default(),
            should_quit: false,
            chat_scroll: 0,
            auto_scroll_chat: true,
            focus: Focus::Input,
            cursor_visible: true,
            last_cursor_blink: Instant::now(),
            command_palette_open: false,
            command_palette_selected: 0,
            command_palette_filter: String::new(),
        }
    }

    /// Update cursor blinking state
    pub fn update_cursor_blink(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_cursor_blink).as_millis() >= 500 {
            self.cursor_visible = !self.cursor_visible;
            self.last_cursor_blink = now;
        }
    }

    /// Whether a request is outstanding and submit is disabled
    pub fn processing(&self) -> bool {
        !self.dispatcher.submit_enabled()
    }

    /// Cursor position in characters
    pub fn cursor_column(&self) -> usize {
        self.input[..self.input_cursor].chars().count()
    }

    /// Bring the input window and the mirror in line with the buffer.
    /// Called after every change to the input, cursor or width.
    pub fn sync_view(&mut self) {
        let width = self.input_width.max(1);
        let column = self.cursor_column();
        if column < self.input_scroll {
            self.input_scroll = column;
        } else if column >= self.input_scroll + width {
            self.input_scroll = column + 1 - width;
        }
        let max_scroll = (self.input.chars().count() + 1).saturating_sub(width);
        self.input_scroll = self.input_scroll.min(max_scroll);
        self.mirror.sync(&self.input, self.input_scroll);
    }

    /// Empty the input line and its mirror
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.input_cursor = 0;
        self.input_scroll = 0;
        self.mirror.clear();
    }

    pub fn close_palette(&mut self) {
        self.command_palette_open = false;
        self.command_palette_filter.clear();
        self.command_palette_selected = 0;
    }

    /// Palette commands matching the current filter
    pub fn filtered_commands(&self) -> Vec<&'static PaletteCommand> {
        let filter = self.command_palette_filter.to_lowercase();
        PALETTE_COMMANDS
            .iter()
            .filter(|cmd| {
                filter.is_empty()
                    || cmd.name.contains(&filter)
                    || cmd.description.to_lowercase().contains(&filter)
            })
            .collect()
    }
}
