use std::time::{Duration, Instant};

pub const DEFAULT_FEEDBACK_TTL: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
}

impl FeedbackKind {
    pub fn message(self) -> &'static str {
        match self {
            FeedbackKind::Correct => "\u{2713} Correct!",
            FeedbackKind::Incorrect => "\u{2717} Try again!",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub expires_at: Instant,
}

/// Holds at most one feedback message. Showing a new message replaces the old
/// one together with its deadline, so an earlier expiry can never clear a
/// newer message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackSlot {
    current: Option<Feedback>,
    ttl: Duration,
}

impl Default for FeedbackSlot {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_TTL)
    }
}

impl FeedbackSlot {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn show(&mut self, kind: FeedbackKind, now: Instant) {
        self.current = Some(Feedback {
            kind,
            expires_at: now + self.ttl,
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The message visible at `now`, if any.
    pub fn active(&self, now: Instant) -> Option<FeedbackKind> {
        self.current
            .filter(|f| now < f.expires_at)
            .map(|f| f.kind)
    }

    pub fn current(&self) -> Option<Feedback> {
        self.current
    }

    /// Drop the message once its deadline has passed. Returns true if a
    /// message was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.current {
            Some(f) if now >= f.expires_at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
