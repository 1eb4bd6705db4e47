use crate::state::{AppState, Focus};
use lisbeth_core::{DispatchPhase, EchoMode};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Component for rendering the status line
pub struct StatusComponent;

impl StatusComponent {
    /// Render the status line
    pub fn render(state: &AppState, f: &mut Frame, area: Rect) {
        let focus_indicator = match state.focus {
            Focus::Input => "Input focused".to_string(),
            Focus::Transcript => format!(
                "Transcript focused{}",
                if state.auto_scroll_chat { " [Auto-scroll]" } else { "" }
            ),
        };
        let hidden = if state.mirror.echo() == EchoMode::Hidden {
            " | 🔒 Input hidden"
        } else {
            ""
        };

        let status_text = match state.dispatcher.phase() {
            DispatchPhase::Idle => format!(
                "Ready - {} | {}{} | / for commands, Tab to switch, Ctrl+O open link, Ctrl+C quit",
                state.dispatcher.backend_info().name,
                focus_indicator,
                hidden
            ),
            DispatchPhase::Sending | DispatchPhase::Rendering => format!(
                "● Waiting for {} repl{}... | Esc to cancel | {}{}",
                state.dispatcher.in_flight(),
                if state.dispatcher.in_flight() == 1 { "y" } else { "ies" },
                focus_indicator,
                hidden
            ),
        };

        let status = Paragraph::new(status_text).style(if state.processing() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Green)
        });

        f.render_widget(status, area);
    }
}
