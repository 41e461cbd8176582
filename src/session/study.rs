use std::time::{Duration, Instant};

use thiserror::Error;

use crate::session::catalog::{BasketId, Catalog, Keyword, KeywordId};
use crate::session::feedback::{FeedbackKind, FeedbackSlot};

pub const DEFAULT_SUBJECT: &str = "Untitled Subject";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Edit,
    Play,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Edit => "edit",
            Mode::Play => "play",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    Basket(BasketId),
    Pool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Nothing was being dragged.
    NoDrag,
    Assigned { keyword: KeywordId, basket: BasketId },
    Unassigned(KeywordId),
    Correct(KeywordId),
    Incorrect(KeywordId),
    /// The drop had no meaning in the current mode.
    Ignored,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StartPlayError {
    #[error("Please add keywords and baskets before starting play mode!")]
    EmptyCatalog,
    #[error("Please assign keywords to baskets before starting play mode!")]
    NothingAssigned,
}

/// The single open study document plus the state of the current drill.
#[derive(Clone, Debug, PartialEq)]
pub struct StudySession {
    subject: String,
    mode: Mode,
    catalog: Catalog,
    play_queue: Vec<KeywordId>,
    round_size: usize,
    mistakes: u32,
    dragged: Option<KeywordId>,
    feedback: FeedbackSlot,
}

impl Default for StudySession {
    fn default() -> Self {
        Self::new()
    }
}

impl StudySession {
    pub fn new() -> Self {
        Self::with_feedback_ttl(crate::session::feedback::DEFAULT_FEEDBACK_TTL)
    }

    pub fn with_feedback_ttl(ttl: Duration) -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            mode: Mode::Edit,
            catalog: Catalog::new(),
            play_queue: Vec::new(),
            round_size: 0,
            mistakes: 0,
            dragged: None,
            feedback: FeedbackSlot::new(ttl),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn play_queue(&self) -> &[KeywordId] {
        &self.play_queue
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn dragged(&self) -> Option<KeywordId> {
        self.dragged
    }

    pub fn feedback(&self, now: Instant) -> Option<FeedbackKind> {
        self.feedback.active(now)
    }

    // --- catalog editing (edit mode only) ---

    pub fn rename_subject(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.subject = name.to_string();
        true
    }

    pub fn add_keyword(&mut self, name: &str) -> Option<KeywordId> {
        if self.mode != Mode::Edit {
            return None;
        }
        let id = self.catalog.add_keyword(name)?;
        tracing::debug!(keyword = %id, "keyword added");
        Some(id)
    }

    pub fn add_basket(&mut self, name: &str, color: String) -> Option<BasketId> {
        if self.mode != Mode::Edit {
            return None;
        }
        let id = self.catalog.add_basket(name, color)?;
        tracing::debug!(basket = %id, "basket added");
        Some(id)
    }

    pub fn delete_keyword(&mut self, id: KeywordId) -> bool {
        if self.mode != Mode::Edit || !self.catalog.delete_keyword(id) {
            return false;
        }
        if self.dragged == Some(id) {
            self.dragged = None;
        }
        tracing::debug!(keyword = %id, "keyword deleted");
        true
    }

    pub fn delete_basket(&mut self, id: BasketId) -> bool {
        if self.mode != Mode::Edit || !self.catalog.delete_basket(id) {
            return false;
        }
        tracing::debug!(basket = %id, "basket deleted");
        true
    }

    // --- mode control ---

    pub fn enter_play(&mut self) -> Result<(), StartPlayError> {
        if self.catalog.keywords().is_empty() || self.catalog.baskets().is_empty() {
            return Err(StartPlayError::EmptyCatalog);
        }
        if self.catalog.assigned().next().is_none() {
            return Err(StartPlayError::NothingAssigned);
        }
        self.restart_round();
        self.mode = Mode::Play;
        tracing::info!(keywords = self.round_size, "play mode started");
        Ok(())
    }

    /// Restart the current drill from the catalog. Only meaningful in play mode.
    pub fn reset_play(&mut self) -> bool {
        if self.mode != Mode::Play {
            return false;
        }
        self.restart_round();
        tracing::info!(keywords = self.round_size, "play mode reset");
        true
    }

    pub fn exit_play(&mut self) {
        if self.mode == Mode::Play {
            tracing::info!(
                solved = self.solved_count(),
                mistakes = self.mistakes,
                "play mode left"
            );
        }
        self.mode = Mode::Edit;
        self.play_queue.clear();
        self.round_size = 0;
        self.mistakes = 0;
        self.dragged = None;
        self.feedback.clear();
    }

    fn restart_round(&mut self) {
        self.play_queue = self.catalog.assigned().map(|k| k.id).collect();
        self.round_size = self.play_queue.len();
        self.mistakes = 0;
        self.dragged = None;
        self.feedback.clear();
    }

    // --- drag and drop ---

    /// Capture `keyword` for a following [`complete_drop`](Self::complete_drop).
    /// In play mode only keywords still waiting in the queue can be picked up.
    pub fn begin_drag(&mut self, keyword: KeywordId) -> bool {
        let draggable = match self.mode {
            Mode::Edit => self.catalog.keyword(keyword).is_some(),
            Mode::Play => self.play_queue.contains(&keyword),
        };
        self.dragged = draggable.then_some(keyword);
        draggable
    }

    pub fn cancel_drag(&mut self) {
        self.dragged = None;
    }

    pub fn complete_drop(&mut self, target: DropTarget) -> DropOutcome {
        self.complete_drop_at(target, Instant::now())
    }

    pub fn complete_drop_at(&mut self, target: DropTarget, now: Instant) -> DropOutcome {
        let Some(keyword) = self.dragged.take() else {
            return DropOutcome::NoDrag;
        };

        let outcome = match (self.mode, target) {
            (Mode::Edit, DropTarget::Basket(basket)) => {
                if self.catalog.assign(keyword, Some(basket)) {
                    DropOutcome::Assigned { keyword, basket }
                } else {
                    DropOutcome::Ignored
                }
            }
            (Mode::Edit, DropTarget::Pool) => {
                if self.catalog.assign(keyword, None) {
                    DropOutcome::Unassigned(keyword)
                } else {
                    DropOutcome::Ignored
                }
            }
            (Mode::Play, DropTarget::Basket(basket)) => self.answer(keyword, basket, now),
            (Mode::Play, DropTarget::Pool) => DropOutcome::Ignored,
        };

        tracing::debug!(mode = self.mode.as_str(), ?target, ?outcome, "drop");
        outcome
    }

    fn answer(&mut self, keyword: KeywordId, basket: BasketId, now: Instant) -> DropOutcome {
        let Some(position) = self.play_queue.iter().position(|&k| k == keyword) else {
            return DropOutcome::Ignored;
        };
        let truth = self.catalog.keyword(keyword).and_then(|k| k.assigned_basket);
        if truth == Some(basket) {
            self.play_queue.remove(position);
            self.feedback.show(FeedbackKind::Correct, now);
            if self.play_queue.is_empty() {
                tracing::info!(mistakes = self.mistakes, "study round complete");
            }
            DropOutcome::Correct(keyword)
        } else {
            self.mistakes += 1;
            self.feedback.show(FeedbackKind::Incorrect, now);
            DropOutcome::Incorrect(keyword)
        }
    }

    pub fn expire_feedback(&mut self, now: Instant) -> bool {
        self.feedback.expire(now)
    }

    // --- document replacement ---

    /// Swap in a freshly loaded document. Always lands in edit mode with a
    /// clean drill state.
    pub fn replace_document(&mut self, subject: String, catalog: Catalog) {
        self.subject = subject;
        self.catalog = catalog;
        self.mode = Mode::Edit;
        self.play_queue.clear();
        self.round_size = 0;
        self.mistakes = 0;
        self.dragged = None;
        self.feedback.clear();
    }

    // --- view queries ---

    /// Keywords shown in the pool: unassigned ones while editing, the
    /// unsolved queue while playing.
    pub fn pool_keywords(&self) -> Vec<&Keyword> {
        match self.mode {
            Mode::Edit => self.catalog.unassigned().collect(),
            Mode::Play => self
                .play_queue
                .iter()
                .filter_map(|&id| self.catalog.keyword(id))
                .collect(),
        }
    }

    /// Keywords shown inside a basket. Answers stay hidden while playing.
    pub fn basket_keywords(&self, basket: BasketId) -> Vec<&Keyword> {
        match self.mode {
            Mode::Edit => self.catalog.keywords_in(basket).collect(),
            Mode::Play => Vec::new(),
        }
    }

    pub fn remaining_count(&self) -> usize {
        self.play_queue.len()
    }

    pub fn solved_count(&self) -> usize {
        self.round_size.saturating_sub(self.play_queue.len())
    }

    pub fn round_size(&self) -> usize {
        self.round_size
    }

    pub fn is_complete(&self) -> bool {
        self.mode == Mode::Play && self.play_queue.is_empty()
    }

    /// Share of drops that were correct, as a percentage.
    pub fn accuracy(&self) -> f64 {
        let solved = self.solved_count() as f64;
        let attempts = solved + self.mistakes as f64;
        if attempts == 0.0 {
            return 100.0;
        }
        solved / attempts * 100.0
    }
}
