use std::sync::Arc;

use crate::feedback::state::WordFocusState;
use crate::options::{SpeechOptions, SpeechSetup};

const ENABLE_LOGS: bool = true;

use crate::log_info;

pub const THRESHOLD_FACTOR: f64 = 4.0;

/// Text-to-speech backend. Playback lives outside this crate; only the request
/// to pronounce something crosses this boundary.
pub trait Speaker: Send + Sync {
    fn say(&self, language: &str, text: &str);
}

/// Speaker that only writes the request to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn say(&self, language: &str, text: &str) {
        log::info!("say [{language}]: {text}");
    }
}

/// Pronounces a word once its sustained focus passes the threshold.
#[derive(Clone)]
pub struct SpeechInspector {
    options: SpeechOptions,
    speaker: Arc<dyn Speaker>,
}

impl SpeechInspector {
    pub fn new(options: SpeechOptions, speaker: Arc<dyn Speaker>) -> Self {
        let mut options = options;
        options.threshold.factor = THRESHOLD_FACTOR;

        Self { options, speaker }
    }

    pub fn enabled(&self) -> bool {
        !self.options.language.is_empty()
    }

    pub fn options(&self) -> &SpeechOptions {
        &self.options
    }

    pub fn setup(&self) -> SpeechSetup {
        SpeechSetup {
            options: self.options.clone(),
            enabled: self.enabled(),
        }
    }

    /// Speaks `text` in the configured language. Silent when disabled.
    pub fn say(&self, text: &str) {
        if !self.enabled() {
            return;
        }
        self.speaker.say(&self.options.language, text);
    }

    pub fn inspect(&self, state: &mut WordFocusState) -> bool {
        if !self.enabled() || state.pronounced {
            return false;
        }

        let threshold = self.options.threshold.effective(state.word.chars().count());
        if state.accumulated_ms as f64 <= threshold {
            return false;
        }

        state.pronounced = true;
        log_info!("pronouncing {:?}", state.word);
        self.speaker.say(&self.options.language, &state.word);
        true
    }

    pub fn set_avg_word_reading_duration(&mut self, avg_word_reading_ms: f64) {
        self.options
            .threshold
            .adapt_to_reading_duration(avg_word_reading_ms);
    }
}

impl std::fmt::Debug for SpeechInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechInspector")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
