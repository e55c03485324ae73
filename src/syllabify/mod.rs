pub mod exceptions;
pub mod render;
pub mod rules;

use crate::feedback::state::WordFocusState;
use crate::options::{SyllabMode, SyllabOptions, SyllabificationSetup};

use exceptions::ExceptionTable;
use rules::Rule;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Canonical boundary mark. Exceptions are stored with it and rendered output
/// uses it unless the caller asks for another separator.
pub const HYPHEN: char = '\u{00B7}';

/// Threshold factor applied to the average word reading time.
pub const THRESHOLD_FACTOR: f64 = 4.0;

/// Result of a syllabification trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllabification {
    pub markup: String,
    /// The word should go back to plain text after the revert delay.
    pub temporary: bool,
}

/// Splits words into syllables and decides when a focused word needs it.
///
/// Without a rule for the configured language the syllabifier is disabled and
/// every operation hands its input back untouched.
#[derive(Debug, Clone)]
pub struct Syllabifier {
    options: SyllabOptions,
    rule: Option<Rule>,
    exceptions: ExceptionTable,
    hyphen_markup: String,
}

impl Syllabifier {
    pub fn new(options: SyllabOptions) -> Self {
        let mut options = options;
        options.threshold.factor = THRESHOLD_FACTOR;

        let rule = rules::rule_for(&options.language);
        let exceptions = ExceptionTable::new(&options.exceptions);

        log_info!(
            "syllabifier created: language={:?} mode={:?} exceptions={} enabled={}",
            options.language,
            options.mode,
            exceptions.len(),
            rule.is_some()
        );

        Self {
            options,
            rule,
            exceptions,
            hyphen_markup: render::hyphen_markup(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.rule.is_some()
    }

    pub fn options(&self) -> &SyllabOptions {
        &self.options
    }

    pub fn setup(&self) -> SyllabificationSetup {
        SyllabificationSetup {
            options: self.options.clone(),
            hyphen: HYPHEN,
            enabled: self.enabled(),
        }
    }

    /// Syllabifies `word`, placing `separator` at each boundary. In colors
    /// mode the separator is ignored and the syllables come back as colored
    /// spans.
    pub fn syllabify_word(&self, word: &str, separator: &str) -> String {
        let Some(rule) = self.rule else {
            return word.to_string();
        };

        log_debug!("syllabifying {:?}", word);

        let colors = self.options.mode == SyllabMode::Colors;
        let canonical = HYPHEN.to_string();
        let separator = if colors { canonical.as_str() } else { separator };

        let result = match self.exceptions.find(word) {
            Some(found) => {
                log_debug!("{:?} matches an exception", word);
                self.exceptions.format(word, found, separator)
            }
            None => rule(word, separator),
        };

        if colors {
            render::colorize(result.split(HYPHEN))
        } else {
            result
        }
    }

    /// Markup shown when the word is syllabified in place.
    pub fn markup_for(&self, word: &str) -> Option<String> {
        self.enabled()
            .then(|| self.syllabify_word(word, &self.hyphen_markup))
    }

    /// Hyphen mode preview: pads the word with as many hyphens as it has
    /// boundaries, split around it.
    pub fn prepare_word(&self, word: &str) -> String {
        if word.is_empty() || !self.enabled() || self.options.mode != SyllabMode::Hyphen {
            return word.to_string();
        }

        let syllabified = self.syllabify_word(word, &HYPHEN.to_string());
        let hyphen_count = syllabified
            .chars()
            .count()
            .saturating_sub(word.chars().count());

        render::pad_with_hyphens(word, hyphen_count)
    }

    /// Prepares every word of every line; words are lowercased first.
    pub fn prepare_text(&self, lines: &[String]) -> Vec<String> {
        if !self.enabled() || self.options.mode != SyllabMode::Hyphen {
            return lines.to_vec();
        }

        lines
            .iter()
            .map(|line| {
                line.split(' ')
                    .map(|word| self.prepare_word(&word.to_lowercase()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Plain text of prepared or syllabified markup.
    pub fn unprepare(&self, text: &str) -> String {
        render::strip(text)
    }

    /// Syllables in a space separated string.
    pub fn count_syllables(&self, text: &str) -> usize {
        if !self.enabled() {
            return 0;
        }

        text.split(' ').map(|word| self.word_syllables(word)).sum()
    }

    /// Syllables in a list of lines; words are lowercased before counting.
    pub fn count_syllables_in_lines(&self, lines: &[String]) -> usize {
        if !self.enabled() {
            return 0;
        }

        lines
            .iter()
            .flat_map(|line| line.split(' '))
            .map(|word| self.word_syllables(&word.to_lowercase()))
            .sum()
    }

    fn word_syllables(&self, word: &str) -> usize {
        let Some(rule) = self.rule else {
            return 0;
        };
        if word.is_empty() {
            return 0;
        }

        let separated = match self.exceptions.find(word) {
            Some(found) => self.exceptions.format(word, found, " "),
            None => rule(word, " "),
        };
        separated.split(' ').count()
    }

    /// Fires once per word when its sustained focus passes the (length
    /// adjusted) threshold.
    pub fn inspect(&self, state: &mut WordFocusState) -> Option<Syllabification> {
        if !self.enabled() || state.syllabified {
            return None;
        }

        let threshold = self.options.threshold.effective(state.word.chars().count());
        if state.accumulated_ms as f64 <= threshold {
            return None;
        }

        state.syllabified = true;

        Some(Syllabification {
            markup: self.syllabify_word(&state.word, &self.hyphen_markup),
            temporary: self.options.temporary,
        })
    }

    pub fn set_avg_word_reading_duration(&mut self, avg_word_reading_ms: f64) {
        self.options
            .threshold
            .adapt_to_reading_duration(avg_word_reading_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Exceptions;
    use crate::threshold::Threshold;
    use tokio::time::Instant;

    fn finnish(mode: SyllabMode) -> SyllabOptions {
        SyllabOptions {
            language: "fi".into(),
            mode,
            threshold: Threshold::new(300.0, true, 200.0, 600.0, false),
            ..SyllabOptions::default()
        }
    }

    #[test]
    fn test_disabled_for_unknown_language() {
        let syllabifier = Syllabifier::new(SyllabOptions {
            language: "klingon".into(),
            ..SyllabOptions::default()
        });

        assert!(!syllabifier.enabled());
        assert_eq!(syllabifier.syllabify_word("kala", "-"), "kala");
        assert_eq!(syllabifier.markup_for("kala"), None);
        assert_eq!(syllabifier.count_syllables("kala talo"), 0);

        let mut state = WordFocusState::new("kala", Instant::now());
        state.accumulated_ms = 10_000;
        assert!(syllabifier.inspect(&mut state).is_none());
        assert!(!state.syllabified);
    }

    #[test]
    fn test_hyphen_mode_uses_requested_separator() {
        let syllabifier = Syllabifier::new(finnish(SyllabMode::Hyphen));
        assert_eq!(syllabifier.syllabify_word("kala", "-"), "ka-la");
        assert_eq!(
            syllabifier.markup_for("kala").unwrap(),
            "ka<span class=\"hyphen\">·</span>la"
        );
    }

    #[test]
    fn test_colors_mode_ignores_separator() {
        let syllabifier = Syllabifier::new(finnish(SyllabMode::Colors));
        assert_eq!(
            syllabifier.syllabify_word("kala", "-"),
            "<span style=\"color: black\">ka</span><span style=\"color: red\">la</span>"
        );
    }

    #[test]
    fn test_exception_takes_precedence() {
        let mut options = finnish(SyllabMode::Hyphen);
        options.exceptions = [("auto", "au-to")].into_iter().collect::<Exceptions>();
        let syllabifier = Syllabifier::new(options);

        assert_eq!(syllabifier.syllabify_word("automaatti", "-"), "au-tomaatti");
        assert_eq!(syllabifier.syllabify_word("Auto", "-"), "Au-to");
    }

    #[test]
    fn test_prepare_and_unprepare_round_trip() {
        let syllabifier = Syllabifier::new(finnish(SyllabMode::Hyphen));
        let lines = vec!["kala ui".to_string(), "kreikka on maailma".to_string()];

        let prepared = syllabifier.prepare_text(&lines);
        assert_ne!(prepared, lines);
        assert!(prepared[0].starts_with("<span class=\"hyphens\">·</span>kala"));

        let restored: Vec<String> = prepared.iter().map(|l| syllabifier.unprepare(l)).collect();
        assert_eq!(restored, lines);
    }

    #[test]
    fn test_round_trip_keeps_angle_brackets() {
        let syllabifier = Syllabifier::new(finnish(SyllabMode::Hyphen));
        let lines = vec!["kala <3 talo".to_string(), "a<b".to_string()];

        let restored: Vec<String> = syllabifier
            .prepare_text(&lines)
            .iter()
            .map(|l| syllabifier.unprepare(l))
            .collect();
        assert_eq!(restored, lines);
    }

    #[test]
    fn test_prepare_is_noop_outside_hyphen_mode() {
        let syllabifier = Syllabifier::new(finnish(SyllabMode::Colors));
        let lines = vec!["Kala Ui".to_string()];
        assert_eq!(syllabifier.prepare_text(&lines), lines);
        assert_eq!(syllabifier.prepare_word("kala"), "kala");
    }

    #[test]
    fn test_count_syllables() {
        let mut options = finnish(SyllabMode::Colors);
        options.exceptions = Exceptions::from_text("auto=au to");
        let syllabifier = Syllabifier::new(options);

        assert_eq!(syllabifier.count_syllables("kala  maailma"), 5);
        assert_eq!(syllabifier.count_syllables("auto"), 2);
        assert_eq!(
            syllabifier.count_syllables_in_lines(&["Kala talo".into(), "kreikka".into()]),
            6
        );
    }

    #[test]
    fn test_inspect_fires_once() {
        let syllabifier = Syllabifier::new(finnish(SyllabMode::Hyphen));
        let mut state = WordFocusState::new("kala", Instant::now());

        state.accumulated_ms = 300;
        assert!(syllabifier.inspect(&mut state).is_none());

        state.accumulated_ms = 330;
        let fired = syllabifier.inspect(&mut state).unwrap();
        assert!(!fired.temporary);
        assert!(state.syllabified);

        state.accumulated_ms = 1000;
        assert!(syllabifier.inspect(&mut state).is_none());
    }

    #[test]
    fn test_smart_threshold_uses_factor_four() {
        let mut syllabifier = Syllabifier::new(finnish(SyllabMode::Hyphen));
        syllabifier.set_avg_word_reading_duration(100.0);
        assert_eq!(syllabifier.options().threshold.value, 400.0);
        assert_eq!(syllabifier.setup().options.threshold.value, 400.0);
    }
}
