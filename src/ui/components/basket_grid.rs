use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use crate::session::study::StudySession;
use crate::ui::layout::BoardLayout;
use crate::ui::theme::Theme;

/// Which basket (and optionally which keyword line inside it) has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasketFocus {
    pub basket: usize,
    pub item: Option<usize>,
}

pub struct BasketGrid<'a> {
    session: &'a StudySession,
    layout: &'a BoardLayout,
    focus: Option<BasketFocus>,
    theme: &'a Theme,
}

impl<'a> BasketGrid<'a> {
    pub fn new(
        session: &'a StudySession,
        layout: &'a BoardLayout,
        focus: Option<BasketFocus>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            layout,
            focus,
            theme,
        }
    }

    fn render_basket(&self, index: usize, rect: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let basket = &self.session.catalog().baskets()[index];
        let bg = colors.basket_bg(&basket.color);
        let focused = self.focus.is_some_and(|f| f.basket == index);
        let dragging = self.session.dragged().is_some();

        let mut title = format!(" {}. {} ", index + 1, basket.name);
        if focused && dragging {
            title.push_str("\u{21e3} ");
        }
        let (border_type, border_fg) = if focused {
            (BorderType::Thick, colors.accent())
        } else {
            (BorderType::Plain, colors.basket_fg())
        };
        let block = Block::bordered()
            .border_type(border_type)
            .title(Span::styled(
                title,
                Style::default().fg(colors.basket_fg()).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(border_fg))
            .style(Style::default().bg(bg).fg(colors.basket_fg()));
        let inner = block.inner(rect);
        block.render(rect, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let keywords = self.session.basket_keywords(basket.id);
        if keywords.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Drop keywords here",
                Style::default().add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .render(Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1), buf);
            return;
        }

        for (j, keyword) in keywords.iter().enumerate().take(inner.height as usize) {
            let row = Rect::new(inner.x, inner.y + j as u16, inner.width, 1);
            let held = self.session.dragged() == Some(keyword.id);
            let mut style = Style::default().fg(colors.basket_fg()).bg(bg);
            if focused && self.focus.and_then(|f| f.item) == Some(j) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            if held {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            let marker = if held { "\u{00bb} " } else { "\u{2022} " };
            buf.set_style(row, style);
            buf.set_stringn(
                row.x,
                row.y,
                format!("{marker}{}", keyword.name),
                row.width as usize,
                style,
            );
        }
    }
}

impl Widget for BasketGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focus.is_some() {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(" Lesson Baskets ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let baskets = self.session.catalog().baskets();
        if baskets.is_empty() {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No lesson baskets yet",
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Press [b] to create your first lesson section",
                    Style::default().fg(colors.muted()),
                )),
            ];
            Paragraph::new(lines).alignment(Alignment::Center).render(inner, buf);
            return;
        }

        let mut hidden = 0;
        for (i, rect) in self.layout.baskets.iter().enumerate().take(baskets.len()) {
            if rect.is_empty() {
                hidden += 1;
                continue;
            }
            self.render_basket(i, *rect, buf);
        }

        if hidden > 0 {
            let note = format!(" +{hidden} more baskets ");
            let x = area.right().saturating_sub(note.len() as u16 + 1);
            buf.set_string(x, area.bottom().saturating_sub(1), note, Style::default().fg(colors.muted()));
        }
    }
}
