use std::sync::Arc;

use tokio::time::Instant;

use crate::feedback::state::WordId;
use crate::options::{SpeechOptions, WarningOptions, WarningSetup};
use crate::speech::{Speaker, SpeechInspector};
use crate::threshold::Threshold;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Tells the reader to get back to the text after focus has been away from
/// it for longer than the threshold. Fires once per idle episode.
#[derive(Debug, Clone)]
pub struct WarningDetector {
    options: WarningOptions,
    last_focused: Option<WordId>,
    text_left_at: Option<Instant>,
    speaker: Option<SpeechInspector>,
}

impl WarningDetector {
    pub fn new(options: WarningOptions, speaker: Arc<dyn Speaker>) -> Self {
        // warnings use a plain timeout, never an adaptive one
        let speaker = (!options.language.is_empty()).then(|| {
            SpeechInspector::new(
                SpeechOptions {
                    language: options.language.clone(),
                    threshold: Threshold::fixed(options.threshold.value),
                },
                speaker,
            )
        });

        Self {
            options,
            last_focused: None,
            text_left_at: None,
            speaker,
        }
    }

    pub fn enabled(&self) -> bool {
        !self.options.language.is_empty()
    }

    pub fn phrase(&self) -> &str {
        self.options.phrase_or_default()
    }

    pub fn setup(&self) -> WarningSetup {
        WarningSetup {
            options: self.options.clone(),
            enabled: self.enabled(),
        }
    }

    /// Called every tick with the current focus.
    pub fn inspect(&mut self, current: Option<WordId>, now: Instant) -> bool {
        if !self.enabled() {
            return false;
        }

        if current.is_some() {
            self.text_left_at = None;
            self.last_focused = current;
            return false;
        }

        if self.last_focused.take().is_some() {
            self.text_left_at = Some(now);
        }

        let Some(left_at) = self.text_left_at else {
            return false;
        };

        let away_ms = now.saturating_duration_since(left_at).as_secs_f64() * 1000.0;
        if away_ms <= self.options.threshold.value {
            return false;
        }

        log_info!("reader away from text for {:.0} ms, warning", away_ms);
        if let Some(speaker) = &self.speaker {
            speaker.say(self.phrase());
        }
        self.text_left_at = None;
        true
    }

    /// Forgets the last focus and any running idle episode.
    pub fn reset(&mut self) {
        self.last_focused = None;
        self.text_left_at = None;
    }
}
