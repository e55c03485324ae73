//! Gaze-driven reading feedback.
//!
//! The layout side reports which word the reader is looking at through
//! [`FeedbackScheduler::set_focused_word`]. A 30 ms tick turns those reports
//! into sustained-focus times per word and fires syllabification, speech,
//! highlighting and off-text warnings as [`FeedbackEvent`]s.

pub mod feedback;
pub mod highlight;
pub mod options;
pub mod settings;
pub mod speech;
pub mod syllabify;
pub mod threshold;
mod utils;
pub mod warning;

pub use feedback::{
    EventReceiver, FeedbackEngine, FeedbackEvent, FeedbackScheduler, SchedulerConfig, WordId,
    WordTarget,
};
pub use options::{
    Exceptions, FeedbackOptions, Feedbacks, HighlightOptions, SpeechOptions, SyllabMode,
    SyllabOptions, WarningOptions,
};
pub use settings::OptionsStore;
pub use speech::{LogSpeaker, Speaker};
pub use syllabify::Syllabifier;
pub use threshold::Threshold;
