use crate::state::{AppState, Focus};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::debug;

const PAGE: usize = 10;
const WHEEL_STEP: usize = 3;

/// Handles input events for the application
pub struct InputHandler;

impl InputHandler {
    /// Handle input events (keyboard and mouse)
    pub fn handle_event(state: &mut AppState, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Self::handle_key_event(state, key);
            }
            Event::Mouse(mouse_event) => {
                Self::handle_mouse_event(state, mouse_event);
            }
            Event::Paste(text) if state.focus == Focus::Input && !state.command_palette_open => {
                // single-line input
                for ch in text.chars().filter(|c| !c.is_control()) {
                    Self::insert_char(state, ch);
                }
                state.sync_view();
            }
            _ => {}
        }
    }

    pub fn handle_key_event(state: &mut AppState, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            state.should_quit = true;
            return;
        }
        if ctrl && key.code == KeyCode::Char('o') {
            state.dispatcher.open_last_link();
            state.auto_scroll_chat = true;
            return;
        }
        if state.command_palette_open {
            Self::handle_palette_key(state, key.code);
            return;
        }

        match key.code {
            KeyCode::Tab => {
                state.focus = match state.focus {
                    Focus::Input => Focus::Transcript,
                    Focus::Transcript => Focus::Input,
                };
            }
            KeyCode::Esc => {
                if state.dispatcher.in_flight() > 0 {
                    let cancelled = state.dispatcher.cancel_in_flight();
                    debug!("Cancelled {} request(s)", cancelled);
                } else {
                    state.clear_input();
                    state.focus = Focus::Input;
                }
            }
            KeyCode::PageUp => Self::scroll_up(state, PAGE),
            KeyCode::PageDown => Self::scroll_down(state, PAGE),
            KeyCode::Up if state.focus == Focus::Transcript => Self::scroll_up(state, 1),
            KeyCode::Down if state.focus == Focus::Transcript => Self::scroll_down(state, 1),
            KeyCode::End if state.focus == Focus::Transcript => {
                state.auto_scroll_chat = true;
            }
            KeyCode::Home if state.focus == Focus::Transcript => {
                state.chat_scroll = 0;
                state.auto_scroll_chat = false;
            }
            _ if state.focus == Focus::Input => Self::handle_input_key(state, key.code),
            _ => {}
        }
    }

    fn handle_input_key(state: &mut AppState, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                Self::submit_input(state);
                return;
            }
            // Open command palette when typing '/' into empty input
            KeyCode::Char('/') if state.input.is_empty() => {
                state.command_palette_open = true;
                state.command_palette_selected = 0;
                state.command_palette_filter.clear();
                return;
            }
            KeyCode::Char(c) => Self::insert_char(state, c),
            KeyCode::Backspace => Self::delete_char(state),
            KeyCode::Delete => Self::delete_char_forward(state),
            KeyCode::Left => Self::move_cursor_left(state),
            KeyCode::Right => Self::move_cursor_right(state),
            KeyCode::Home => state.input_cursor = 0,
            KeyCode::End => state.input_cursor = state.input.len(),
            _ => return,
        }
        state.sync_view();
    }

    fn handle_palette_key(state: &mut AppState, code: KeyCode) {
        match code {
            KeyCode::Esc => state.close_palette(),
            KeyCode::Up => {
                state.command_palette_selected = state.command_palette_selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let count = state.filtered_commands().len();
                if state.command_palette_selected + 1 < count {
                    state.command_palette_selected += 1;
                }
            }
            KeyCode::Enter => Self::execute_selected_command(state),
            KeyCode::Backspace => {
                // Close command palette if filter is empty and backspace is pressed
                if state.command_palette_filter.pop().is_none() {
                    state.close_palette();
                } else {
                    state.command_palette_selected = 0;
                }
            }
            KeyCode::Char(c) if c.is_alphanumeric() || c == '/' || c == ' ' || c == '-' => {
                state.command_palette_filter.push(c);
                // Reset selection when filter changes
                state.command_palette_selected = 0;
            }
            _ => {}
        }
    }

    fn handle_mouse_event(state: &mut AppState, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::ScrollUp => Self::scroll_up(state, WHEEL_STEP),
            MouseEventKind::ScrollDown => Self::scroll_down(state, WHEEL_STEP),
            _ => {}
        }
    }

    // Manual scrolling turns auto-scroll off until End is pressed
    fn scroll_up(state: &mut AppState, lines: usize) {
        state.chat_scroll = state.chat_scroll.saturating_sub(lines);
        state.auto_scroll_chat = false;
    }

    fn scroll_down(state: &mut AppState, lines: usize) {
        state.chat_scroll = state.chat_scroll.saturating_add(lines);
        state.auto_scroll_chat = false;
    }

    /// Submit the current input to the dispatcher
    fn submit_input(state: &mut AppState) {
        if state.input.trim().is_empty() || state.processing() {
            return;
        }

        let input = std::mem::take(&mut state.input);
        state.clear_input();
        state.auto_scroll_chat = true;

        let outcome = state.dispatcher.submit(&input);
        debug!("Submitted line: {:?}", outcome);
    }

    /// Run a palette command by name
    pub fn run_command(state: &mut AppState, name: &str) {
        state.auto_scroll_chat = true;
        match name {
            "/new" => {
                state.dispatcher.new_session();
                state.clear_input();
                state.chat_scroll = 0;
            }
            "/memory" if !state.processing() => {
                state.dispatcher.recall_memory();
            }
            "/forget" if !state.processing() => {
                state.dispatcher.forget_memory();
            }
            "/help" => state.dispatcher.help(),
            "/quit" => state.should_quit = true,
            _ => debug!("Ignoring palette command {}", name),
        }
    }

    /// Execute the currently selected command
    fn execute_selected_command(state: &mut AppState) {
        let selected = state
            .filtered_commands()
            .get(state.command_palette_selected)
            .map(|cmd| cmd.name);
        state.close_palette();
        if let Some(name) = selected {
            Self::run_command(state, name);
        }
    }

    /// Insert a character at the cursor position
    fn insert_char(state: &mut AppState, ch: char) {
        state.input.insert(state.input_cursor, ch);
        state.input_cursor += ch.len_utf8();
    }

    /// Delete character before cursor
    fn delete_char(state: &mut AppState) {
        if let Some(ch) = state.input[..state.input_cursor].chars().next_back() {
            state.input_cursor -= ch.len_utf8();
            state.input.remove(state.input_cursor);
        }
    }

    /// Delete character under cursor
    fn delete_char_forward(state: &mut AppState) {
        if state.input_cursor < state.input.len() {
            state.input.remove(state.input_cursor);
        }
    }

    fn move_cursor_left(state: &mut AppState) {
        if let Some(ch) = state.input[..state.input_cursor].chars().next_back() {
            state.input_cursor -= ch.len_utf8();
        }
    }

    fn move_cursor_right(state: &mut AppState) {
        if let Some(ch) = state.input[state.input_cursor..].chars().next() {
            state.input_cursor += ch.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lisbeth_core::{
        Author, Config, DisabledNavigator, Dispatcher, EchoMode, EventBus, MemoryStore, MockBackend,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn app_state(delay: Duration) -> AppState {
        let bus = EventBus::new();
        let dispatcher = Dispatcher::new(
            Arc::new(MockBackend::new().with_delay(delay)),
            Box::new(MemoryStore::new()),
            Arc::new(DisabledNavigator),
            bus.sender(),
            &Config::default(),
        );
        AppState::new(dispatcher, bus.into_receiver())
    }

    fn press(state: &mut AppState, code: KeyCode) {
        InputHandler::handle_key_event(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(state: &mut AppState, text: &str) {
        for ch in text.chars() {
            press(state, KeyCode::Char(ch));
        }
    }

    #[tokio::test]
    async fn test_mirror_hides_password_while_typing() {
        let mut state = app_state(Duration::from_millis(10));
        type_text(&mut state, "check password s3cr3t");

        assert_eq!(state.input, "check password s3cr3t");
        assert_eq!(state.mirror.text(), "check password ******");
        assert_eq!(state.mirror.echo(), EchoMode::Hidden);

        for _ in 0.."s3cr3t ".len() {
            press(&mut state, KeyCode::Backspace);
        }
        assert_eq!(state.mirror.text(), "check password");
        assert_eq!(state.mirror.echo(), EchoMode::Plain);
    }

    #[tokio::test]
    async fn test_enter_submits_and_clears_input() {
        let mut state = app_state(Duration::from_secs(5));
        type_text(&mut state, "check password hunter2");
        press(&mut state, KeyCode::Enter);

        assert!(state.input.is_empty());
        assert_eq!(state.mirror.text(), "");
        assert!(state.processing());

        let transcript = state.dispatcher.transcript();
        // welcome, masked user line, placeholder
        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.entries()[1].to_plain_text(),
            "user@hostname:~$ check password *******"
        );
        assert!(transcript.entries()[2].is_pending());
    }

    #[tokio::test]
    async fn test_enter_is_ignored_while_processing() {
        let mut state = app_state(Duration::from_secs(5));
        type_text(&mut state, "hello");
        press(&mut state, KeyCode::Enter);
        type_text(&mut state, "again");
        press(&mut state, KeyCode::Enter);

        assert_eq!(state.input, "again");
        assert_eq!(state.dispatcher.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_escape_cancels_in_flight_request() {
        let mut state = app_state(Duration::from_secs(5));
        type_text(&mut state, "security news");
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Esc);

        let event = tokio::time::timeout(Duration::from_secs(2), state.event_receiver.recv())
            .await
            .unwrap()
            .unwrap();
        crate::handlers::EventHandler::handle_event(&mut state, event);

        let last = state.dispatcher.transcript().entries().last().unwrap();
        assert_eq!(last.author, Author::Error);
        assert_eq!(last.to_plain_text(), "❌ Error: request cancelled");
        assert!(!state.processing());
    }

    #[tokio::test]
    async fn test_palette_runs_filtered_command() {
        let mut state = app_state(Duration::from_millis(10));
        press(&mut state, KeyCode::Char('/'));
        assert!(state.command_palette_open);
        assert!(state.input.is_empty());

        type_text(&mut state, "help");
        assert_eq!(state.filtered_commands().len(), 1);
        press(&mut state, KeyCode::Enter);

        assert!(!state.command_palette_open);
        let text = state.dispatcher.transcript().to_plain_text();
        assert!(text.contains("check email <address>"));
    }

    #[tokio::test]
    async fn test_new_session_clears_transcript() {
        let mut state = app_state(Duration::from_secs(5));
        type_text(&mut state, "hello");
        press(&mut state, KeyCode::Enter);

        InputHandler::run_command(&mut state, "/new");
        assert_eq!(state.dispatcher.transcript().len(), 1);
        assert!(!state.processing());
    }

    #[tokio::test]
    async fn test_tab_moves_focus_and_scrolling_disables_autoscroll() {
        let mut state = app_state(Duration::from_millis(10));
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.focus, Focus::Transcript);

        type_text(&mut state, "abc");
        assert!(state.input.is_empty());

        press(&mut state, KeyCode::Up);
        assert!(!state.auto_scroll_chat);
        press(&mut state, KeyCode::End);
        assert!(state.auto_scroll_chat);
    }

    #[tokio::test]
    async fn test_input_window_follows_cursor() {
        let mut state = app_state(Duration::from_millis(10));
        state.input_width = 10;
        type_text(&mut state, "check password abcdefgh");

        // cursor sits one past the last character
        assert_eq!(state.input_scroll, 23 + 1 - 10);
        assert_eq!(state.mirror.scroll(), state.input_scroll);
        assert_eq!(state.mirror.visible(10), " ********");

        press(&mut state, KeyCode::Home);
        assert_eq!(state.input_scroll, 0);
        assert_eq!(state.mirror.visible(10), "check pass");
    }

    #[tokio::test]
    async fn test_multibyte_editing() {
        let mut state = app_state(Duration::from_millis(10));
        type_text(&mut state, "héllo");
        press(&mut state, KeyCode::Left);
        press(&mut state, KeyCode::Left);
        press(&mut state, KeyCode::Left);
        press(&mut state, KeyCode::Backspace);
        assert_eq!(state.input, "hllo");
        press(&mut state, KeyCode::Delete);
        assert_eq!(state.input, "hlo");
    }
}
