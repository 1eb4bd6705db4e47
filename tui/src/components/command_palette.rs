use crate::state::AppState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Component for rendering the command palette overlay
pub struct CommandPaletteComponent;

impl CommandPaletteComponent {
    /// Render the command palette overlay
    pub fn render(state: &AppState, f: &mut Frame) {
        let area = f.size();

        // Centered, 60% width, 50% height
        let popup_width = area.width * 60 / 100;
        let popup_height = area.height * 50 / 100;
        let popup_area = Rect {
            x: (area.width - popup_width) / 2,
            y: (area.height - popup_height) / 2,
            width: popup_width,
            height: popup_height,
        };

        // Clear the background
        f.render_widget(Clear, popup_area);

        let filtered_commands = state.filtered_commands();
        let filter_hint = if state.command_palette_filter.is_empty() {
            "(type to filter)".to_string()
        } else {
            format!("(filter: {})", state.command_palette_filter)
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!("Session commands {}", filter_hint),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        if filtered_commands.is_empty() {
            lines.push(Line::from(Span::styled(
                "No matching commands found",
                Style::default().fg(Color::Red),
            )));
        }
        for (i, cmd) in filtered_commands.iter().enumerate() {
            let is_selected = i == state.command_palette_selected;
            let style = if is_selected {
                Style::default().bg(Color::DarkGray).fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            lines.push(Line::from(vec![
                Span::styled(if is_selected { "► " } else { "  " }, style),
                Span::styled(
                    cmd.name,
                    style.fg(if is_selected { Color::Yellow } else { Color::Green }),
                ),
                Span::styled(
                    format!("  {}", cmd.description),
                    style.fg(if is_selected { Color::White } else { Color::Gray }),
                ),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "↑↓ Navigate • Enter Select • Esc Close",
            Style::default().fg(Color::DarkGray),
        )));

        let popup = Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                    .title(" Commands ")
                    .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            )
            .wrap(ratatui::widgets::Wrap { trim: false });

        f.render_widget(popup, popup_area);
    }
}
