use std::path::Path;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{Config, expand_home};
use crate::session::catalog::{BasketId, KeywordId};
use crate::session::study::{DropOutcome, DropTarget, Mode, StudySession};
use crate::store::json_store::DocumentStore;
use crate::store::schema::Document;
use crate::ui::components::basket_grid::BasketFocus;
use crate::ui::layout::Hit;
use crate::ui::line_input::LineInput;
use crate::ui::theme::{Theme, random_basket_color};

pub const LOAD_ERROR: &str = "Error loading file. Please check the file format.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Pool,
    Baskets,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    AddKeyword,
    AddBasket,
    RenameSubject,
    Export,
    Import,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::AddKeyword => "New keyword",
            PromptKind::AddBasket => "New lesson basket",
            PromptKind::RenameSubject => "Subject",
            PromptKind::Export => "Save to file",
            PromptKind::Import => "Load from file",
        }
    }
}

#[derive(Debug)]
pub enum Overlay {
    None,
    Prompt { kind: PromptKind, input: LineInput },
    Warning(String),
    Help,
}

pub struct App {
    pub session: StudySession,
    pub config: Config,
    pub theme: &'static Theme,
    pub store: DocumentStore,
    pub focus: Focus,
    pub pool_cursor: usize,
    /// Index of the first pool keyword on screen.
    pub pool_scroll: usize,
    /// Index into [`App::board_slots`].
    pub board_cursor: usize,
    pub overlay: Overlay,
    pub status: Option<String>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let store = DocumentStore::new(config.document_path());
        let session = StudySession::with_feedback_ttl(config.feedback_ttl());

        Self {
            session,
            config,
            theme,
            store,
            focus: Focus::Pool,
            pool_cursor: 0,
            pool_scroll: 0,
            board_cursor: 0,
            overlay: Overlay::None,
            status: None,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        }
    }

    // --- focus and cursors ---

    /// Every focusable spot in the basket panel, in display order: each
    /// basket header followed by its visible keyword lines.
    pub fn board_slots(&self) -> Vec<BasketFocus> {
        let mut slots = Vec::new();
        for (i, basket) in self.session.catalog().baskets().iter().enumerate() {
            slots.push(BasketFocus {
                basket: i,
                item: None,
            });
            let count = self.session.basket_keywords(basket.id).len();
            slots.extend((0..count).map(|j| BasketFocus {
                basket: i,
                item: Some(j),
            }));
        }
        slots
    }

    pub fn basket_focus(&self) -> Option<BasketFocus> {
        if self.focus != Focus::Baskets {
            return None;
        }
        self.board_slots().get(self.board_cursor).copied()
    }

    pub fn pool_selection(&self) -> Option<usize> {
        (self.focus == Focus::Pool).then_some(self.pool_cursor)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Pool => Focus::Baskets,
            Focus::Baskets => Focus::Pool,
        };
        self.clamp_cursors();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Focus::Pool => {
                let len = self.session.pool_keywords().len();
                self.pool_cursor = step(self.pool_cursor, delta, len);
            }
            Focus::Baskets => {
                let len = self.board_slots().len();
                self.board_cursor = step(self.board_cursor, delta, len);
            }
        }
    }

    /// Adjust `pool_scroll` so the pool cursor sits inside a window of
    /// `visible` rows.
    pub fn scroll_pool_into_view(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.pool_cursor < self.pool_scroll {
            self.pool_scroll = self.pool_cursor;
        } else if self.pool_cursor >= self.pool_scroll + visible {
            self.pool_scroll = self.pool_cursor + 1 - visible;
        }
        let len = self.session.pool_keywords().len();
        self.pool_scroll = self.pool_scroll.min(len.saturating_sub(visible));
    }

    fn clamp_cursors(&mut self) {
        let pool_len = self.session.pool_keywords().len();
        self.pool_cursor = self.pool_cursor.min(pool_len.saturating_sub(1));
        let slots = self.board_slots().len();
        self.board_cursor = self.board_cursor.min(slots.saturating_sub(1));
    }

    fn focused_keyword(&self) -> Option<KeywordId> {
        match self.focus {
            Focus::Pool => self
                .session
                .pool_keywords()
                .get(self.pool_cursor)
                .map(|k| k.id),
            Focus::Baskets => {
                let slot = self.basket_focus()?;
                let basket = self.basket_id_at(slot.basket)?;
                let item = slot.item?;
                self.session.basket_keywords(basket).get(item).map(|k| k.id)
            }
        }
    }

    fn basket_id_at(&self, index: usize) -> Option<BasketId> {
        self.session.catalog().baskets().get(index).map(|b| b.id)
    }

    // --- drag and drop ---

    pub fn grab_focused(&mut self) -> bool {
        match self.focused_keyword() {
            Some(id) => self.session.begin_drag(id),
            None => false,
        }
    }

    /// Drop the held keyword on whatever has focus. Grabs the focused keyword
    /// instead when nothing is held.
    pub fn activate(&mut self) {
        if self.session.dragged().is_none() {
            self.grab_focused();
            return;
        }
        let target = match self.focus {
            Focus::Pool => Some(DropTarget::Pool),
            Focus::Baskets => self
                .basket_focus()
                .and_then(|slot| self.basket_id_at(slot.basket))
                .map(DropTarget::Basket),
        };
        match target {
            Some(target) => self.drop_on(target),
            None => self.session.cancel_drag(),
        }
    }

    /// Drop onto the `number`th basket (1-based). With nothing held, the
    /// focused keyword is picked up first.
    pub fn drop_on_basket_number(&mut self, number: usize) {
        let Some(basket) = number.checked_sub(1).and_then(|i| self.basket_id_at(i)) else {
            return;
        };
        if self.session.dragged().is_none() && !self.grab_focused() {
            return;
        }
        self.drop_on(DropTarget::Basket(basket));
    }

    pub fn cancel_drag(&mut self) {
        self.session.cancel_drag();
    }

    fn drop_on(&mut self, target: DropTarget) {
        let outcome = self.session.complete_drop(target);
        if let DropOutcome::Assigned { keyword, basket } = outcome
            && let (Some(k), Some(b)) = (
                self.session.catalog().keyword(keyword),
                self.session.catalog().basket(basket),
            )
        {
            self.status = Some(format!("{} \u{2192} {}", k.name, b.name));
        }
        self.clamp_cursors();
    }

    pub fn mouse_down(&mut self, hit: Option<Hit>) {
        match hit {
            Some(Hit::PoolRow(row)) => {
                self.focus = Focus::Pool;
                let id = self.session.pool_keywords().get(row).map(|k| k.id);
                if let Some(id) = id {
                    self.pool_cursor = row;
                    self.session.begin_drag(id);
                }
            }
            Some(Hit::BasketRow(basket, row)) => {
                self.focus_basket(basket, Some(row));
                let id = self
                    .basket_id_at(basket)
                    .and_then(|b| self.session.basket_keywords(b).get(row).map(|k| k.id));
                if let Some(id) = id {
                    self.session.begin_drag(id);
                }
            }
            Some(Hit::Basket(basket)) => self.focus_basket(basket, None),
            Some(Hit::Pool) => self.focus = Focus::Pool,
            None => {}
        }
    }

    pub fn mouse_up(&mut self, hit: Option<Hit>) {
        if self.session.dragged().is_none() {
            return;
        }
        let target = match hit {
            Some(Hit::Basket(i)) | Some(Hit::BasketRow(i, _)) => {
                self.basket_id_at(i).map(DropTarget::Basket)
            }
            Some(Hit::Pool) | Some(Hit::PoolRow(_)) => Some(DropTarget::Pool),
            None => None,
        };
        match target {
            Some(target) => self.drop_on(target),
            None => self.session.cancel_drag(),
        }
    }

    fn focus_basket(&mut self, basket: usize, item: Option<usize>) {
        let slot = BasketFocus { basket, item };
        let slots = self.board_slots();
        let index = slots
            .iter()
            .position(|s| *s == slot)
            .or_else(|| slots.iter().position(|s| s.basket == basket));
        if let Some(index) = index {
            self.focus = Focus::Baskets;
            self.board_cursor = index;
        }
    }

    // --- catalog editing ---

    pub fn delete_focused(&mut self) {
        if self.session.mode() != Mode::Edit {
            return;
        }
        if let Some(id) = self.focused_keyword() {
            self.session.delete_keyword(id);
        } else if let Some(slot) = self.basket_focus()
            && slot.item.is_none()
            && let Some(id) = self.basket_id_at(slot.basket)
        {
            self.session.delete_basket(id);
        }
        self.clamp_cursors();
    }

    // --- mode control ---

    pub fn start_play(&mut self) {
        match self.session.enter_play() {
            Ok(()) => {
                self.focus = Focus::Pool;
                self.pool_cursor = 0;
                self.pool_scroll = 0;
                self.board_cursor = 0;
            }
            Err(e) => {
                tracing::debug!(error = %e, "play mode refused");
                self.overlay = Overlay::Warning(e.to_string());
            }
        }
    }

    pub fn reset_play(&mut self) {
        if self.session.reset_play() {
            self.pool_cursor = 0;
            self.pool_scroll = 0;
        }
    }

    pub fn exit_play(&mut self) {
        self.session.exit_play();
        self.clamp_cursors();
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.session.expire_feedback(now);
    }

    // --- prompts ---

    pub fn open_prompt(&mut self, kind: PromptKind) {
        let editing = self.session.mode() == Mode::Edit;
        let input = match kind {
            PromptKind::AddKeyword | PromptKind::AddBasket if !editing => return,
            PromptKind::AddKeyword | PromptKind::AddBasket => LineInput::new(""),
            PromptKind::RenameSubject => LineInput::new(self.session.subject()),
            PromptKind::Export => {
                let path = self.store.default_export_path(self.session.subject());
                LineInput::for_path(&path.to_string_lossy())
            }
            PromptKind::Import => {
                let suggestion = self
                    .store
                    .list_documents()
                    .into_iter()
                    .next()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| {
                        format!("{}{}", self.store.base_dir().display(), std::path::MAIN_SEPARATOR)
                    });
                LineInput::for_path(&suggestion)
            }
        };
        self.overlay = Overlay::Prompt { kind, input };
    }

    /// Apply a confirmed prompt. Blank values are ignored.
    pub fn submit_prompt(&mut self, kind: PromptKind, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match kind {
            PromptKind::AddKeyword => {
                self.session.add_keyword(value);
            }
            PromptKind::AddBasket => {
                let color = random_basket_color(&mut self.rng);
                self.session.add_basket(value, color);
            }
            PromptKind::RenameSubject => {
                self.session.rename_subject(value);
            }
            PromptKind::Export => self.export_document(&expand_home(value)),
            PromptKind::Import => self.import_document(&expand_home(value)),
        }
        self.clamp_cursors();
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    // --- persistence ---

    pub fn export_document(&mut self, path: &Path) {
        let doc = Document::from_session(&self.session);
        match self.store.export_to(path, &doc) {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "export failed");
                self.overlay = Overlay::Warning(format!("Could not save file: {e:#}"));
            }
        }
    }

    pub fn import_document(&mut self, path: &Path) {
        match self.store.import_from(path) {
            Ok(doc) => {
                let (subject, catalog, cleared) = doc.into_parts();
                if cleared > 0 {
                    tracing::warn!(
                        path = %path.display(),
                        cleared,
                        "cleared assignments to missing baskets"
                    );
                }
                self.session.replace_document(subject, catalog);
                self.focus = Focus::Pool;
                self.pool_cursor = 0;
                self.pool_scroll = 0;
                self.board_cursor = 0;
                self.status = Some(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "import rejected");
                self.overlay = Overlay::Warning(LOAD_ERROR.to_string());
            }
        }
    }

    /// Switch to the next bundled theme. Persisting the choice is left to the
    /// caller.
    pub fn cycle_theme(&mut self) {
        let themes = Theme::available_themes();
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) => themes.get((idx + 1) % themes.len()),
            None => themes.first(),
        };
        let Some(next) = next.cloned() else {
            return;
        };
        if let Some(theme) = Theme::load(&next) {
            self.theme = Box::leak(Box::new(theme));
            self.config.theme = next;
            self.status = Some(format!("Theme: {}", self.config.theme));
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(dir: &Path) -> App {
        let config = Config {
            document_dir: dir.to_string_lossy().into_owned(),
            ..Config::default()
        };
        App::new(config)
    }

    fn seeded(dir: &Path) -> App {
        let mut app = test_app(dir);
        app.submit_prompt(PromptKind::AddKeyword, "Cell");
        app.submit_prompt(PromptKind::AddKeyword, "Atom");
        app.submit_prompt(PromptKind::AddBasket, "Biology");
        app.submit_prompt(PromptKind::AddBasket, "Chemistry");
        app
    }

    #[test]
    fn number_key_sorts_focused_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());

        app.drop_on_basket_number(1); // Cell -> Biology
        app.drop_on_basket_number(2); // Atom -> Chemistry

        let catalog = app.session.catalog();
        let biology = catalog.baskets()[0].id;
        let chemistry = catalog.baskets()[1].id;
        assert_eq!(catalog.keywords()[0].assigned_basket, Some(biology));
        assert_eq!(catalog.keywords()[1].assigned_basket, Some(chemistry));
        assert!(app.session.pool_keywords().is_empty());
    }

    #[test]
    fn out_of_range_basket_number_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        app.drop_on_basket_number(9);
        app.drop_on_basket_number(0);
        assert_eq!(app.session.pool_keywords().len(), 2);
        assert!(app.session.dragged().is_none());
    }

    #[test]
    fn grab_then_drop_on_focused_basket() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());

        app.activate();
        assert!(app.session.dragged().is_some());
        app.toggle_focus();
        app.move_cursor(1); // second basket header
        app.activate();

        assert!(app.session.dragged().is_none());
        let chemistry = app.session.catalog().baskets()[1].id;
        assert_eq!(app.session.catalog().keywords()[0].assigned_basket, Some(chemistry));
    }

    #[test]
    fn board_slots_list_headers_and_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        app.drop_on_basket_number(1);

        let slots = app.board_slots();
        assert_eq!(
            slots,
            vec![
                BasketFocus { basket: 0, item: None },
                BasketFocus { basket: 0, item: Some(0) },
                BasketFocus { basket: 1, item: None },
            ]
        );
    }

    #[test]
    fn delete_focused_basket_returns_keywords_to_pool() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        app.drop_on_basket_number(1);
        assert_eq!(app.session.pool_keywords().len(), 1);

        app.toggle_focus();
        app.delete_focused();

        assert_eq!(app.session.catalog().baskets().len(), 1);
        assert_eq!(app.session.pool_keywords().len(), 2);
    }

    #[test]
    fn play_refusal_shows_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.start_play();
        match &app.overlay {
            Overlay::Warning(msg) => {
                assert_eq!(msg, "Please add keywords and baskets before starting play mode!")
            }
            other => panic!("expected warning, got {other:?}"),
        }
        assert_eq!(app.session.mode(), Mode::Edit);

        let mut app = seeded(dir.path());
        app.start_play();
        match &app.overlay {
            Overlay::Warning(msg) => {
                assert_eq!(msg, "Please assign keywords to baskets before starting play mode!")
            }
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn play_round_through_mouse() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        app.drop_on_basket_number(1);
        app.drop_on_basket_number(2);
        app.start_play();
        assert_eq!(app.session.mode(), Mode::Play);
        assert_eq!(app.session.remaining_count(), 2);

        // Cell dropped on Chemistry: wrong.
        app.mouse_down(Some(Hit::PoolRow(0)));
        app.mouse_up(Some(Hit::Basket(1)));
        assert_eq!(app.session.mistakes(), 1);
        assert_eq!(app.session.remaining_count(), 2);

        // Cell dropped on Biology: right.
        app.mouse_down(Some(Hit::PoolRow(0)));
        app.mouse_up(Some(Hit::BasketRow(0, 3)));
        assert_eq!(app.session.remaining_count(), 1);

        // Released outside the board: cancelled.
        app.mouse_down(Some(Hit::PoolRow(0)));
        app.mouse_up(None);
        assert!(app.session.dragged().is_none());
        assert_eq!(app.session.remaining_count(), 1);
    }

    #[test]
    fn add_prompts_ignored_in_play_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        app.drop_on_basket_number(1);
        app.start_play();

        app.open_prompt(PromptKind::AddKeyword);
        assert!(matches!(app.overlay, Overlay::None));
        app.open_prompt(PromptKind::RenameSubject);
        assert!(matches!(
            app.overlay,
            Overlay::Prompt { kind: PromptKind::RenameSubject, .. }
        ));
    }

    #[test]
    fn blank_prompt_values_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.submit_prompt(PromptKind::AddKeyword, "   ");
        app.submit_prompt(PromptKind::RenameSubject, "");
        assert!(app.session.catalog().is_empty());
        assert_eq!(app.session.subject(), "Untitled Subject");
    }

    #[test]
    fn export_then_import_restores_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        app.submit_prompt(PromptKind::RenameSubject, "Science 101");
        app.drop_on_basket_number(1);
        let before = app.session.catalog().clone();

        let path = app.store.default_export_path(app.session.subject());
        app.export_document(&path);
        assert!(path.ends_with("science_101_keywords.json"));
        assert!(path.exists());

        let mut other = test_app(dir.path());
        other.import_document(&path);
        assert!(matches!(other.overlay, Overlay::None));
        assert_eq!(other.session.subject(), "Science 101");
        assert_eq!(other.session.catalog(), &before);
    }

    #[test]
    fn failed_import_keeps_state_and_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut app = seeded(dir.path());
        let before = app.session.clone();
        app.import_document(&path);

        assert_eq!(app.session, before);
        match &app.overlay {
            Overlay::Warning(msg) => assert_eq!(msg, LOAD_ERROR),
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn import_prompt_suggests_newest_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = seeded(dir.path());
        let path = dir.path().join("only_keywords.json");
        app.export_document(&path);

        app.open_prompt(PromptKind::Import);
        match &app.overlay {
            Overlay::Prompt { input, .. } => assert_eq!(input.value(), path.to_string_lossy()),
            other => panic!("expected prompt, got {other:?}"),
        }
    }

    #[test]
    fn pool_scroll_follows_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        for i in 0..10 {
            app.submit_prompt(PromptKind::AddKeyword, &format!("kw{i}"));
        }

        app.move_cursor(5);
        app.scroll_pool_into_view(3);
        assert_eq!(app.pool_cursor, 5);
        assert_eq!(app.pool_scroll, 3);

        app.move_cursor(-4);
        app.scroll_pool_into_view(3);
        assert_eq!(app.pool_scroll, 1);

        // A taller window never scrolls past the end of the list.
        app.move_cursor(8);
        app.scroll_pool_into_view(20);
        assert_eq!(app.pool_scroll, 0);
    }

    #[test]
    fn clicking_a_scrolled_row_grabs_that_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        for i in 0..10 {
            app.submit_prompt(PromptKind::AddKeyword, &format!("kw{i}"));
        }
        app.move_cursor(9);
        app.scroll_pool_into_view(4);
        assert_eq!(app.pool_scroll, 6);

        let layout = crate::ui::layout::BoardLayout::new(ratatui::layout::Rect::new(0, 0, 120, 40), 0, false);
        let rows = layout.pool_rows();
        let hit = layout.hit(rows.x, rows.y + 1, app.pool_scroll);
        app.mouse_down(hit);

        let held = app.session.dragged().unwrap();
        assert_eq!(app.session.catalog().keyword(held).unwrap().name, "kw7");
        assert_eq!(app.pool_cursor, 7);
    }

    #[test]
    fn cursor_steps_are_clamped() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(5, 1, 0), 0);
    }
}
