use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::layout::centered_rect;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageTone {
    Info,
    Warning,
}

/// Modal box with a title and a few lines of text.
pub struct MessageDialog<'a> {
    title: &'a str,
    lines: Vec<String>,
    tone: MessageTone,
    theme: &'a Theme,
}

impl<'a> MessageDialog<'a> {
    pub fn new(title: &'a str, lines: Vec<String>, tone: MessageTone, theme: &'a Theme) -> Self {
        Self {
            title,
            lines,
            tone,
            theme,
        }
    }
}

impl Widget for MessageDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let height = (self.lines.len() as u16 + 4).max(7);
        let percent_y = (height.saturating_mul(100) / area.height.max(1)).min(100);
        let rect = centered_rect(60, percent_y, area);

        let border = match self.tone {
            MessageTone::Info => colors.accent(),
            MessageTone::Warning => colors.warning(),
        };

        let mut text = vec![Line::from("")];
        text.extend(
            self.lines
                .into_iter()
                .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(colors.fg())))),
        );
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            " [Enter] Close",
            Style::default().fg(colors.muted()),
        )));

        Clear.render(rect, buf);
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(
                Block::bordered()
                    .title(Span::styled(
                        format!(" {} ", self.title),
                        Style::default().fg(border).add_modifier(Modifier::BOLD),
                    ))
                    .border_style(Style::default().fg(border))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(rect, buf);
    }
}

/// Single-line text prompt with a block cursor.
pub struct PromptDialog<'a> {
    title: &'a str,
    input: &'a LineInput,
    theme: &'a Theme,
}

impl<'a> PromptDialog<'a> {
    pub fn new(title: &'a str, input: &'a LineInput, theme: &'a Theme) -> Self {
        Self {
            title,
            input,
            theme,
        }
    }

    pub fn area(area: Rect) -> Rect {
        let percent_y = (700 / area.height.max(1)).min(100);
        centered_rect(60, percent_y, area)
    }
}

impl Widget for PromptDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rect = Self::area(area);

        let (before, cursor, after) = self.input.render_parts();
        let cursor_style = Style::default()
            .fg(colors.bg())
            .bg(colors.fg());
        let text_style = Style::default().fg(colors.fg());

        let input_line = Line::from(vec![
            Span::styled(" > ", Style::default().fg(colors.accent())),
            Span::styled(before.to_string(), text_style),
            Span::styled(cursor.map_or_else(|| " ".to_string(), |c| c.to_string()), cursor_style),
            Span::styled(after.to_string(), text_style),
        ]);

        let lines = vec![
            Line::from(""),
            input_line,
            Line::from(""),
            Line::from(Span::styled(
                " [Enter] Confirm  [Esc] Cancel",
                Style::default().fg(colors.muted()),
            )),
        ];

        Clear.render(rect, buf);
        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(format!(" {} ", self.title))
                    .border_style(Style::default().fg(colors.border_focused()))
                    .style(Style::default().bg(colors.bg())),
            )
            .render(rect, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_shows_current_value() {
        let theme = Theme::default();
        let input = LineInput::new("Biology");
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        PromptDialog::new("Subject", &input, &theme).render(area, &mut buf);

        let rendered: String = buf
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Biology"));
        assert!(rendered.contains("Subject"));
    }

    #[test]
    fn warning_dialog_renders_message() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        MessageDialog::new(
            "Notice",
            vec!["Please add keywords".to_string()],
            MessageTone::Warning,
            &theme,
        )
        .render(area, &mut buf);

        let rendered: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        assert!(rendered.contains("Please add keywords"));
    }
}
