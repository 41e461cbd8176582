use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::study::StudySession;
use crate::ui::theme::Theme;

/// Play-mode scoreboard: mistakes, solved and remaining counts plus a
/// completion bar.
pub struct StatsFooter<'a> {
    session: &'a StudySession,
    theme: &'a Theme,
}

impl<'a> StatsFooter<'a> {
    pub fn new(session: &'a StudySession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    fn ratio(&self) -> f64 {
        let total = self.session.round_size();
        if total == 0 {
            return 0.0;
        }
        (self.session.solved_count() as f64 / total as f64).clamp(0.0, 1.0)
    }
}

impl Widget for StatsFooter<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let label = Style::default().fg(colors.muted());
        let mut spans = vec![
            Span::styled(" Mistakes ", label),
            Span::styled(
                self.session.mistakes().to_string(),
                Style::default().fg(colors.incorrect()).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Correct ", label),
            Span::styled(
                self.session.solved_count().to_string(),
                Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Remaining ", label),
            Span::styled(
                self.session.remaining_count().to_string(),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Accuracy ", label),
            Span::styled(
                format!("{:.0}%", self.session.accuracy()),
                Style::default().fg(colors.fg()),
            ),
        ];
        if self.session.is_complete() {
            spans.push(Span::styled(
                "   \u{2713} Study Complete!",
                Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD),
            ));
        }
        Paragraph::new(Line::from(spans)).render(Rect::new(inner.x, inner.y, inner.width, 1), buf);

        if inner.height < 3 {
            return;
        }
        let bar_y = inner.y + 2;
        let bar_x = inner.x + 1;
        let bar_width = inner.width.saturating_sub(2);
        let filled = (self.ratio() * bar_width as f64) as u16;
        for x in bar_x..bar_x + bar_width {
            let bg = if x < bar_x + filled {
                colors.bar_filled()
            } else {
                colors.bar_empty()
            };
            buf[(x, bar_y)].set_style(Style::default().bg(bg));
        }
        let pct = format!("{:.0}%", self.ratio() * 100.0);
        let label_x = bar_x + bar_width.saturating_sub(pct.len() as u16) / 2;
        buf.set_string(label_x, bar_y, &pct, Style::default().fg(colors.fg()));
    }
}
