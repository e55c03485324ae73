use serde::{Deserialize, Serialize};

/// Words up to this many characters use the base threshold unchanged.
pub const LONG_WORD_MIN_LENGTH: usize = 7;

/// Extra share of the base threshold added for each character past
/// [`LONG_WORD_MIN_LENGTH`].
pub const EXTRA_THRESHOLD_PER_CHAR: f64 = 0.05;

/// Dwell-time policy shared by every feedback modality. All values are in
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub value: f64,
    #[serde(default)]
    pub smart: bool,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub adjust_for_word_length: bool,
    /// Multiplier from average word reading time to threshold. Owned by the
    /// inspector, never read from configuration.
    #[serde(skip_deserializing, default)]
    pub factor: f64,
}

impl Threshold {
    pub fn new(value: f64, smart: bool, min: f64, max: f64, adjust_for_word_length: bool) -> Self {
        Self {
            value,
            smart,
            min,
            max,
            adjust_for_word_length,
            factor: 0.0,
        }
    }

    /// A plain timeout: no adaptation, no length adjustment.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, false, 0.0, 0.0, false)
    }

    pub(crate) fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Threshold for a word of `word_len` characters. Longer words need
    /// proportionally more sustained focus when length adjustment is on.
    pub fn effective(&self, word_len: usize) -> f64 {
        if !self.adjust_for_word_length {
            return self.value;
        }

        let extra_chars = word_len as f64 - LONG_WORD_MIN_LENGTH as f64;
        self.value * (1.0 + extra_chars * EXTRA_THRESHOLD_PER_CHAR).max(1.0)
    }

    /// Adapts `value` to the reader's pace. Only smart thresholds move; a zero
    /// duration means "unknown" and is ignored, negative ones clamp to zero.
    pub fn adapt_to_reading_duration(&mut self, avg_word_reading_ms: f64) {
        if !self.smart || avg_word_reading_ms == 0.0 {
            return;
        }

        let duration = avg_word_reading_ms.max(0.0);
        self.value = (duration * self.factor).min(self.max).max(self.min);
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::fixed(0.0)
    }
}
