use crate::state::{AppState, Focus};
use lisbeth_core::transcript::letter;
use lisbeth_core::{Author, Block, Entry, Inline};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{self, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

/// Component for rendering the transcript panel
pub struct ChatComponent;

impl ChatComponent {
    /// Render the transcript
    pub fn render(state: &mut AppState, f: &mut Frame, area: Rect) {
        let available_width = area.width.saturating_sub(2).max(1) as usize;

        let mut chat_lines = Vec::new();
        for entry in state.dispatcher.transcript().entries() {
            chat_lines.extend(Self::entry_lines(entry));
            // Add spacing between entries
            chat_lines.push(Line::from(""));
        }

        // Wrapped height, so scrolling stops at the real bottom
        let content_height: usize = chat_lines
            .iter()
            .map(|line| line.width().max(1).div_ceil(available_width))
            .sum();
        let visible_height = area.height.saturating_sub(2) as usize;
        let max_scroll = content_height.saturating_sub(visible_height);

        let scroll_pos = if state.auto_scroll_chat {
            max_scroll
        } else {
            state.chat_scroll.min(max_scroll)
        };
        // Update the stored scroll position to prevent phantom scrolling
        state.chat_scroll = scroll_pos;

        let focused = state.focus == Focus::Transcript;
        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = if focused { " Lisbeth [FOCUSED] " } else { " Lisbeth " };

        let chat = Paragraph::new(Text::from(chat_lines))
            .block(
                widgets::Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(title),
            )
            .wrap(Wrap { trim: false })
            .scroll((scroll_pos.min(u16::MAX as usize) as u16, 0));
        f.render_widget(chat, area);

        if content_height > visible_height {
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            let mut scrollbar_state = ScrollbarState::new(max_scroll.max(1)).position(scroll_pos);
            f.render_stateful_widget(
                scrollbar,
                area.inner(&Margin { vertical: 1, horizontal: 0 }),
                &mut scrollbar_state,
            );
        }
    }

    /// Styled lines for one transcript row: the prompt, then every block
    pub fn entry_lines(entry: &Entry) -> Vec<Line<'static>> {
        let prompt = Span::styled(entry.author.prompt().to_string(), Self::prompt_style(entry.author));
        let body_style = Self::body_style(entry.author);

        let mut lines: Vec<Line<'static>> = entry
            .blocks
            .iter()
            .flat_map(|block| Self::block_lines(block, body_style))
            .collect();

        // Single-line rows read like a shell: prompt and text on one line
        match lines.len() {
            0 => lines.push(Line::from(prompt)),
            1 => {
                let mut spans = vec![prompt, Span::raw(" ")];
                spans.append(&mut lines[0].spans);
                lines[0] = Line::from(spans);
            }
            _ => lines.insert(0, Line::from(prompt)),
        }
        lines
    }

    fn prompt_style(author: Author) -> Style {
        let color = match author {
            Author::User => Color::Cyan,
            Author::Tool(_) => Color::Green,
            Author::System => Color::Yellow,
            Author::Error => Color::Red,
            Author::Pending => Color::Magenta,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    fn body_style(author: Author) -> Style {
        match author {
            Author::Error => Style::default().fg(Color::Red),
            Author::Pending => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            Author::System => Style::default().fg(Color::Yellow),
            _ => Style::default(),
        }
    }

    fn block_lines(block: &Block, style: Style) -> Vec<Line<'static>> {
        let link = Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
        match block {
            Block::Rich(parts) => Self::rich_lines(parts, style, link),
            Block::Headline(text) => vec![Line::from(Span::styled(
                text.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))],
            Block::Caption(text) => vec![Line::from(Span::styled(
                text.clone(),
                style.add_modifier(Modifier::BOLD),
            ))],
            Block::Lettered(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{}. ", letter(idx)),
                            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(item.clone(), style),
                    ])
                })
                .collect(),
            Block::Tiles(tiles) => tiles
                .iter()
                .map(|tile| {
                    Line::from(vec![
                        Span::styled(
                            format!("[{}] ", tile.label),
                            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(tile.url.clone(), link),
                    ])
                })
                .collect(),
            Block::Notice(_) => Self::styled(block, Style::default().fg(Color::Yellow)),
            Block::Error(_) => Self::styled(block, Style::default().fg(Color::Red)),
            Block::Text(_) | Block::Bullets(_) | Block::Numbered(_) => Self::styled(block, style),
        }
    }

    fn styled(block: &Block, style: Style) -> Vec<Line<'static>> {
        block
            .lines()
            .into_iter()
            .map(|line| Line::from(Span::styled(line, style)))
            .collect()
    }

    /// Split inline runs into lines, keeping link spans distinct
    fn rich_lines(parts: &[Inline], style: Style, link: Style) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut current: Vec<Span<'static>> = Vec::new();
        for part in parts {
            match part {
                Inline::Link(url) => current.push(Span::styled(url.clone(), link)),
                Inline::Plain(text) => {
                    let mut pieces = text.split('\n');
                    if let Some(first) = pieces.next() {
                        if !first.is_empty() {
                            current.push(Span::styled(first.to_string(), style));
                        }
                    }
                    for piece in pieces {
                        lines.push(Line::from(std::mem::take(&mut current)));
                        if !piece.is_empty() {
                            current.push(Span::styled(piece.to_string(), style));
                        }
                    }
                }
            }
        }
        if !current.is_empty() {
            lines.push(Line::from(current));
        }
        lines
    }
}
