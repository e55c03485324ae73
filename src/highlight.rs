use crate::feedback::state::WordFocusState;
use crate::options::{HighlightOptions, HighlightSetup};

pub const THRESHOLD_FACTOR: f64 = 4.0;

/// Colors a word once its sustained focus passes the threshold. The color is
/// never taken back within a session.
#[derive(Debug, Clone)]
pub struct Highlighter {
    options: HighlightOptions,
}

impl Highlighter {
    pub fn new(options: HighlightOptions) -> Self {
        let mut options = options;
        options.threshold.factor = THRESHOLD_FACTOR;

        Self { options }
    }

    pub fn enabled(&self) -> bool {
        !self.options.language.is_empty()
    }

    pub fn color(&self) -> &str {
        &self.options.color
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    pub fn setup(&self) -> HighlightSetup {
        HighlightSetup {
            options: self.options.clone(),
            enabled: self.enabled(),
        }
    }

    pub fn inspect(&self, state: &mut WordFocusState) -> bool {
        if !self.enabled() || state.highlighted {
            return false;
        }

        // the base threshold is for short words; each extra character adds to it
        let threshold = self.options.threshold.effective(state.word.chars().count());
        if state.accumulated_ms as f64 <= threshold {
            return false;
        }

        state.highlighted = true;
        log::debug!("highlighted {:?} with {}", state.word, self.options.color);
        true
    }

    pub fn set_avg_word_reading_duration(&mut self, avg_word_reading_ms: f64) {
        self.options
            .threshold
            .adapt_to_reading_duration(avg_word_reading_ms);
    }
}
