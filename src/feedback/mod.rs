pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod state;

pub use config::SchedulerConfig;
pub use controller::FeedbackScheduler;
pub use engine::{FeedbackEngine, PendingRevert, TickOutcome};
pub use events::{EventReceiver, EventSink, FeedbackEvent};
pub use state::{WordFocusSnapshot, WordFocusState, WordId, WordRegistry, WordTarget};
