use serde::Serialize;
use tokio::sync::mpsc;

use super::state::WordId;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Notifications for the presentation layer. Each one is sent on a state
/// transition, never repeated per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum FeedbackEvent {
    /// Show `markup` in place of the word.
    Syllabified { word: WordId, markup: String },
    /// The word was sent to the speaker.
    Pronounced { word: WordId, text: String },
    /// Apply `color` to the word.
    Highlighted { word: WordId, color: String },
    /// The reader was told to get back to the text.
    Warned { phrase: String },
    /// A temporary syllabification expired; show `text` again.
    Restored { word: WordId, text: String },
}

impl FeedbackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FeedbackEvent::Syllabified { .. } => "syllabified",
            FeedbackEvent::Pronounced { .. } => "pronounced",
            FeedbackEvent::Highlighted { .. } => "highlighted",
            FeedbackEvent::Warned { .. } => "warned",
            FeedbackEvent::Restored { .. } => "restored",
        }
    }

    pub fn word(&self) -> Option<WordId> {
        match self {
            FeedbackEvent::Syllabified { word, .. }
            | FeedbackEvent::Pronounced { word, .. }
            | FeedbackEvent::Highlighted { word, .. }
            | FeedbackEvent::Restored { word, .. } => Some(*word),
            FeedbackEvent::Warned { .. } => None,
        }
    }
}

pub type EventReceiver = mpsc::UnboundedReceiver<FeedbackEvent>;

/// Outbound side of the event channel.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<FeedbackEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: FeedbackEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            log_warn!("dropped {} event: receiver closed", name);
        }
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = FeedbackEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}
