use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Widget};

use crate::session::feedback::FeedbackKind;
use crate::ui::theme::Theme;

const TOAST_WIDTH: u16 = 18;
const TOAST_HEIGHT: u16 = 3;

/// Short-lived verdict box drawn in the top-right corner of `area`.
pub struct FeedbackToast<'a> {
    kind: FeedbackKind,
    theme: &'a Theme,
}

impl<'a> FeedbackToast<'a> {
    pub fn new(kind: FeedbackKind, theme: &'a Theme) -> Self {
        Self { kind, theme }
    }

    /// Where the toast goes inside `area`.
    pub fn placement(area: Rect) -> Rect {
        let width = TOAST_WIDTH.min(area.width);
        let height = TOAST_HEIGHT.min(area.height);
        Rect::new(
            area.right().saturating_sub(width + 1).max(area.x),
            area.y + 1u16.min(area.height.saturating_sub(height)),
            width,
            height,
        )
    }
}

impl Widget for FeedbackToast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rect = Self::placement(area);
        if rect.is_empty() {
            return;
        }

        let accent = match self.kind {
            FeedbackKind::Correct => colors.correct(),
            FeedbackKind::Incorrect => colors.incorrect(),
        };

        Clear.render(rect, buf);
        Paragraph::new(Line::from(Span::styled(
            self.kind.message(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(colors.bg())),
        )
        .render(rect, buf);
    }
}
