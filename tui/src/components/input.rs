use crate::state::{AppState, Focus};
use lisbeth_core::EchoMode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Component for rendering the input line. Only the mirror is drawn, so a
/// password being typed is never on screen.
pub struct InputComponent;

impl InputComponent {
    /// Render the input area
    pub fn render(state: &mut AppState, f: &mut Frame, area: Rect) {
        // Calculate available width for text (accounting for borders)
        let text_width = area.width.saturating_sub(2).max(1) as usize;
        if text_width != state.input_width {
            state.input_width = text_width;
            state.sync_view();
        }

        let focused = state.focus == Focus::Input;
        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let title = if state.processing() {
            " Input (waiting for reply, Esc to cancel) "
        } else if state.mirror.echo() == EchoMode::Hidden {
            " Input [HIDDEN] "
        } else if focused {
            " Input [FOCUSED] (Enter to send, Tab to switch focus) "
        } else {
            " Input "
        };

        let text_style = if state.processing() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let input_widget = Paragraph::new(state.mirror.visible(text_width))
            .style(text_style)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            );
        f.render_widget(input_widget, area);

        // Render cursor if focused and visible
        if focused && state.cursor_visible && !state.command_palette_open {
            let column = state.cursor_column().saturating_sub(state.mirror.scroll());
            let cursor_x = area.x + 1 + column.min(text_width) as u16;
            let cursor_y = area.y + 1;
            // Make sure cursor is within bounds
            if cursor_x < area.x + area.width.saturating_sub(1) && cursor_y < area.y + area.height.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}
