use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::study::{Mode, StudySession};
use crate::ui::theme::Theme;

/// The column of keywords waiting to be placed.
pub struct KeywordPool<'a> {
    session: &'a StudySession,
    selected: Option<usize>,
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> KeywordPool<'a> {
    /// `selected` is the highlighted keyword; pass `None` when the pool is
    /// not focused. `scroll` is the index of the first keyword drawn.
    pub fn new(
        session: &'a StudySession,
        selected: Option<usize>,
        scroll: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            selected,
            scroll,
            theme,
        }
    }

    fn title(&self) -> &'static str {
        match self.session.mode() {
            Mode::Edit => " Keywords Pool ",
            Mode::Play => " Study Keywords ",
        }
    }

    fn empty_message(&self) -> &'static str {
        match self.session.mode() {
            Mode::Edit => "Drag keywords here or press [a] to add new ones",
            Mode::Play if self.session.is_complete() => "Great! All keywords completed!",
            Mode::Play => "Drag keywords to the correct baskets",
        }
    }
}

impl Widget for KeywordPool<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.selected.is_some() {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(self.title())
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let keywords = self.session.pool_keywords();
        if keywords.is_empty() {
            let style = if self.session.is_complete() {
                Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.muted())
            };
            Paragraph::new(Line::from(Span::styled(self.empty_message(), style)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(inner.inner(Margin::new(1, 1)), buf);
            return;
        }

        let dragged = self.session.dragged();
        let visible = inner.height as usize;
        let scroll = self.scroll.min(keywords.len() - 1);
        for (i, keyword) in keywords.iter().enumerate().skip(scroll).take(visible) {
            let row = Rect::new(inner.x, inner.y + (i - scroll) as u16, inner.width, 1);
            let held = dragged == Some(keyword.id);
            let marker = if held { "\u{00bb} " } else { "  " };

            let mut style = Style::default().fg(colors.fg());
            if self.selected == Some(i) {
                style = style.bg(colors.selection_bg()).add_modifier(Modifier::BOLD);
            }
            if held {
                style = style.fg(colors.grabbed());
            }
            buf.set_style(row, style);
            buf.set_stringn(
                row.x,
                row.y,
                format!("{marker}{}", keyword.name),
                row.width as usize,
                style,
            );
        }

        let muted = Style::default().fg(colors.muted());
        if scroll > 0 {
            let note = format!(" \u{2191}{scroll} ");
            let x = area.right().saturating_sub(note.chars().count() as u16 + 1);
            buf.set_string(x, area.y, note, muted);
        }
        let below = keywords.len().saturating_sub(scroll + visible);
        if below > 0 {
            let note = format!(" +{below} more ");
            let x = area.right().saturating_sub(note.len() as u16 + 1);
            buf.set_string(x, area.bottom().saturating_sub(1), note, muted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Text of the three keyword rows inside a 30x5 pool.
    fn rendered_rows(session: &StudySession, selected: Option<usize>, scroll: usize) -> Vec<String> {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        KeywordPool::new(session, selected, scroll, &theme).render(area, &mut buf);
        (1..4)
            .map(|y| {
                (1..29)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn scrolled_pool_draws_from_offset() {
        let mut session = StudySession::new();
        for name in ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"] {
            session.add_keyword(name);
        }

        assert_eq!(rendered_rows(&session, Some(0), 0), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(rendered_rows(&session, Some(4), 2), vec!["Gamma", "Delta", "Epsilon"]);
    }
}
