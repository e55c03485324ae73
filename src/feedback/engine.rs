use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::highlight::Highlighter;
use crate::options::{FeedbackOptions, Feedbacks};
use crate::speech::{Speaker, SpeechInspector};
use crate::syllabify::Syllabifier;
use crate::warning::WarningDetector;

use super::config::SchedulerConfig;
use super::events::FeedbackEvent;
use super::state::{WordFocusSnapshot, WordFocusState, WordId, WordRegistry, WordTarget};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// A temporary syllabification waiting to be reverted.
#[derive(Debug, Clone)]
pub struct PendingRevert {
    pub word: WordId,
    pub token: CancellationToken,
}

/// What one tick produced.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub events: Vec<FeedbackEvent>,
    pub reverts: Vec<PendingRevert>,
}

/// Synchronous core of the feedback loop: the word registry, the focus
/// pointers and the inspectors. Timing comes in through `now` arguments so the
/// async scheduler owns all timers.
#[derive(Debug)]
pub struct FeedbackEngine {
    config: SchedulerConfig,
    syllabifier: Syllabifier,
    speech: SpeechInspector,
    highlighter: Highlighter,
    warning: WarningDetector,
    words: WordRegistry,
    current: Option<WordId>,
    /// Last non-null focus; survives focus leaving the text.
    last_focused: Option<WordId>,
    session_id: Uuid,
}

impl FeedbackEngine {
    pub fn new(options: FeedbackOptions, speaker: Arc<dyn Speaker>, config: SchedulerConfig) -> Self {
        let FeedbackOptions {
            syllab,
            speech,
            highlight,
            warning,
        } = options;

        Self {
            config,
            syllabifier: Syllabifier::new(syllab),
            speech: SpeechInspector::new(speech, speaker.clone()),
            highlighter: Highlighter::new(highlight),
            warning: WarningDetector::new(warning, speaker),
            words: WordRegistry::new(),
            current: None,
            last_focused: None,
            session_id: Uuid::new_v4(),
        }
    }

    /// True when at least one modality would ever fire.
    pub fn enabled(&self) -> bool {
        self.syllabifier.enabled()
            || self.speech.enabled()
            || self.highlighter.enabled()
            || self.warning.enabled()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn syllabifier(&self) -> &Syllabifier {
        &self.syllabifier
    }

    pub fn current_word(&self) -> Option<WordId> {
        self.current
    }

    pub fn last_focused_word(&self) -> Option<WordId> {
        self.last_focused
    }

    /// Records a focus change and returns the text of the focused word.
    pub fn set_focused_word(&mut self, target: Option<&WordTarget>, now: Instant) -> Option<String> {
        let id = target.map(|t| t.id);
        if id != self.current {
            self.current = id;

            if let Some(target) = target {
                let returning_to_last = Some(target.id) == self.last_focused;
                let reentry_threshold = self.config.reentry_threshold;

                match self.words.get_mut(target.id) {
                    None => {
                        log_debug!("tracking {} {:?}", target.id, target.text);
                        self.words
                            .insert(target.id, WordFocusState::new(target.text.clone(), now));
                    }
                    Some(state) => {
                        if !returning_to_last {
                            state.focus_recorded = false;
                        }
                        if now.saturating_duration_since(state.last_sample) > reentry_threshold {
                            state.entries += 1;
                        }
                        state.last_sample = now;
                    }
                }

                self.last_focused = Some(target.id);
            }
        }

        self.current
            .and_then(|id| self.words.get(id))
            .map(|state| state.word.clone())
    }

    /// Advances every tracked word by one sample and runs the inspectors.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let sample_ms = self.config.sample_ms();
        let focus_threshold_ms = self.config.focus_threshold_ms;
        let trace = self.config.trace_ticks;
        let current = self.current;
        let mut outcome = TickOutcome::default();

        for (id, state) in self.words.iter_mut() {
            state.accumulate(Some(id) == current, sample_ms);

            if state.accumulated_ms > focus_threshold_ms && !state.focus_recorded {
                state.focus_recorded = true;
                state.focus_count += 1;
            }

            if trace {
                log_debug!(
                    "tick {} {:?}: {} ms, entries={}",
                    id,
                    state.word,
                    state.accumulated_ms,
                    state.entries
                );
            }

            if let Some(syllabification) = self.syllabifier.inspect(state) {
                if syllabification.temporary {
                    state.cancel_revert();
                    let token = CancellationToken::new();
                    state.revert = Some(token.clone());
                    outcome.reverts.push(PendingRevert { word: id, token });
                }
                outcome.events.push(FeedbackEvent::Syllabified {
                    word: id,
                    markup: syllabification.markup,
                });
            }

            if self.speech.inspect(state) {
                outcome.events.push(FeedbackEvent::Pronounced {
                    word: id,
                    text: state.word.clone(),
                });
            }

            if self.highlighter.inspect(state) {
                outcome.events.push(FeedbackEvent::Highlighted {
                    word: id,
                    color: self.highlighter.color().to_string(),
                });
            }
        }

        if self.warning.inspect(current, now) {
            outcome.events.push(FeedbackEvent::Warned {
                phrase: self.warning.phrase().to_string(),
            });
        }

        outcome
    }

    /// Ends a pending temporary syllabification. `None` when the word is gone
    /// or its revert was cancelled in the meantime.
    pub fn restore(&mut self, id: WordId) -> Option<FeedbackEvent> {
        let Some(state) = self.words.get_mut(id) else {
            log_warn!("restoring {}: word is no longer tracked", id);
            return None;
        };

        match state.revert.take() {
            Some(token) if !token.is_cancelled() => {
                log_debug!("restoring {} {:?}", id, state.word);
                Some(FeedbackEvent::Restored {
                    word: id,
                    text: state.word.clone(),
                })
            }
            _ => {
                log_warn!("restoring {}: nothing pending", id);
                None
            }
        }
    }

    /// Starts a new reading session. A positive average word reading time
    /// adapts the smart thresholds.
    pub fn reset(&mut self, avg_word_reading_ms: Option<f64>) {
        if let Some(duration) = avg_word_reading_ms {
            self.syllabifier.set_avg_word_reading_duration(duration);
            self.speech.set_avg_word_reading_duration(duration);
            self.highlighter.set_avg_word_reading_duration(duration);
        }

        self.clear();
        self.session_id = Uuid::new_v4();
        log_info!("feedback session {} started", self.session_id);
    }

    /// Drops all per-word state and focus pointers, cancelling pending reverts.
    pub fn clear(&mut self) {
        self.words.clear();
        self.current = None;
        self.last_focused = None;
        self.warning.reset();
    }

    pub fn setup(&self) -> Feedbacks {
        Feedbacks {
            session_id: self.session_id,
            captured_at: Utc::now(),
            speech: self.speech.setup(),
            syllabification: self.syllabifier.setup(),
            highlight: self.highlighter.setup(),
            warning: self.warning.setup(),
        }
    }

    pub fn word_state(&self, id: WordId) -> Option<WordFocusSnapshot> {
        self.words.get(id).map(|state| state.snapshot(id))
    }

    pub fn words(&self) -> Vec<WordFocusSnapshot> {
        self.words
            .iter()
            .map(|(id, state)| state.snapshot(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{HighlightOptions, SyllabMode, SyllabOptions, WarningOptions};
    use crate::speech::LogSpeaker;
    use crate::threshold::Threshold;
    use std::time::Duration;

    fn engine(options: FeedbackOptions) -> FeedbackEngine {
        FeedbackEngine::new(options, Arc::new(LogSpeaker), SchedulerConfig::default())
    }

    fn highlight_options(threshold: f64) -> FeedbackOptions {
        FeedbackOptions {
            highlight: HighlightOptions {
                language: "fi".into(),
                color: "#004080".into(),
                threshold: Threshold::fixed(threshold),
            },
            ..FeedbackOptions::default()
        }
    }

    fn ticks(engine: &mut FeedbackEngine, count: usize, now: Instant) -> Vec<FeedbackEvent> {
        (0..count).flat_map(|_| engine.tick(now).events).collect()
    }

    #[test]
    fn test_dormant_without_any_modality() {
        assert!(!engine(FeedbackOptions::default()).enabled());
        assert!(engine(highlight_options(100.0)).enabled());
    }

    #[test]
    fn test_focus_returns_current_text() {
        let mut engine = engine(highlight_options(100.0));
        let now = Instant::now();
        let kala = WordTarget::new(1, "kala");

        assert_eq!(engine.set_focused_word(Some(&kala), now), Some("kala".into()));
        assert_eq!(engine.set_focused_word(Some(&kala), now), Some("kala".into()));
        assert_eq!(engine.set_focused_word(None, now), None);
        assert_eq!(engine.last_focused_word(), Some(WordId(1)));
        assert_eq!(engine.words().len(), 1);
    }

    #[test]
    fn test_same_text_different_instances_tracked_apart() {
        let mut engine = engine(highlight_options(100.0));
        let now = Instant::now();
        engine.set_focused_word(Some(&WordTarget::new(1, "ja")), now);
        engine.set_focused_word(Some(&WordTarget::new(2, "ja")), now);
        assert_eq!(engine.words().len(), 2);
    }

    #[test]
    fn test_accumulation_grows_decays_and_never_goes_negative() {
        let mut engine = engine(highlight_options(10_000.0));
        let now = Instant::now();
        engine.set_focused_word(Some(&WordTarget::new(1, "kala")), now);
        ticks(&mut engine, 5, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().accumulated_ms, 150);

        engine.set_focused_word(Some(&WordTarget::new(2, "talo")), now);
        ticks(&mut engine, 2, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().accumulated_ms, 90);
        assert_eq!(engine.word_state(WordId(2)).unwrap().accumulated_ms, 60);

        engine.set_focused_word(None, now);
        ticks(&mut engine, 20, now);
        for word in engine.words() {
            assert_eq!(word.accumulated_ms, 0);
        }
    }

    #[test]
    fn test_traced_ticks_accumulate_the_same() {
        let config = SchedulerConfig {
            trace_ticks: true,
            ..SchedulerConfig::default()
        };
        let mut engine =
            FeedbackEngine::new(highlight_options(10_000.0), Arc::new(LogSpeaker), config);
        let now = Instant::now();
        engine.set_focused_word(Some(&WordTarget::new(1, "kala")), now);
        ticks(&mut engine, 4, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().accumulated_ms, 120);
    }

    #[test]
    fn test_focus_count_needs_sustained_focus() {
        let mut engine = engine(highlight_options(10_000.0));
        let now = Instant::now();
        let kala = WordTarget::new(1, "kala");
        let talo = WordTarget::new(2, "talo");

        engine.set_focused_word(Some(&kala), now);
        ticks(&mut engine, 5, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().focus_count, 0);
        ticks(&mut engine, 1, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().focus_count, 1);

        // leaving through null and coming back keeps the recorded focus
        engine.set_focused_word(None, now);
        engine.set_focused_word(Some(&kala), now);
        ticks(&mut engine, 3, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().focus_count, 1);

        // visiting another word in between restarts it
        engine.set_focused_word(Some(&talo), now);
        engine.set_focused_word(Some(&kala), now);
        ticks(&mut engine, 1, now);
        assert_eq!(engine.word_state(WordId(1)).unwrap().focus_count, 2);
    }

    #[test]
    fn test_reentry_counting() {
        let mut engine = engine(highlight_options(10_000.0));
        let t0 = Instant::now();
        let kala = WordTarget::new(1, "kala");
        let talo = WordTarget::new(2, "talo");

        engine.set_focused_word(Some(&kala), t0);
        engine.set_focused_word(Some(&talo), t0 + Duration::from_millis(100));
        engine.set_focused_word(Some(&kala), t0 + Duration::from_millis(900));
        assert_eq!(engine.word_state(WordId(1)).unwrap().entries, 1);

        engine.set_focused_word(Some(&talo), t0 + Duration::from_millis(1000));
        engine.set_focused_word(Some(&kala), t0 + Duration::from_millis(2000));
        assert_eq!(engine.word_state(WordId(1)).unwrap().entries, 2);
    }

    #[test]
    fn test_highlight_fires_once_until_reset() {
        let mut engine = engine(highlight_options(100.0));
        let now = Instant::now();
        let kala = WordTarget::new(1, "kala");

        engine.set_focused_word(Some(&kala), now);
        let events = ticks(&mut engine, 10, now);
        assert_eq!(
            events,
            vec![FeedbackEvent::Highlighted {
                word: WordId(1),
                color: "#004080".into()
            }]
        );

        engine.reset(None);
        assert!(engine.words().is_empty());
        engine.set_focused_word(Some(&kala), now);
        assert_eq!(ticks(&mut engine, 10, now).len(), 1);
    }

    #[test]
    fn test_temporary_syllabification_schedules_revert() {
        let mut engine = engine(FeedbackOptions {
            syllab: SyllabOptions {
                language: "fi".into(),
                mode: SyllabMode::Hyphen,
                temporary: true,
                threshold: Threshold::fixed(50.0),
                ..SyllabOptions::default()
            },
            ..FeedbackOptions::default()
        });
        let now = Instant::now();

        engine.set_focused_word(Some(&WordTarget::new(4, "kala")), now);
        engine.tick(now);
        let outcome = engine.tick(now);
        assert_eq!(outcome.reverts.len(), 1);
        assert!(matches!(
            outcome.events.as_slice(),
            [FeedbackEvent::Syllabified { word: WordId(4), .. }]
        ));

        assert_eq!(
            engine.restore(WordId(4)),
            Some(FeedbackEvent::Restored {
                word: WordId(4),
                text: "kala".into()
            })
        );
        assert_eq!(engine.restore(WordId(4)), None);
        assert!(engine.word_state(WordId(4)).unwrap().syllabified);
    }

    #[test]
    fn test_reset_cancels_reverts_and_adapts_thresholds() {
        let mut engine = engine(FeedbackOptions {
            syllab: SyllabOptions {
                language: "fi".into(),
                temporary: true,
                threshold: Threshold::new(50.0, true, 40.0, 5000.0, false),
                ..SyllabOptions::default()
            },
            ..FeedbackOptions::default()
        });
        let now = Instant::now();

        engine.set_focused_word(Some(&WordTarget::new(1, "kala")), now);
        let reverts: Vec<_> = (0..3).flat_map(|_| engine.tick(now).reverts).collect();
        assert_eq!(reverts.len(), 1);

        let session = engine.session_id();
        engine.reset(Some(250.0));
        assert!(reverts[0].token.is_cancelled());
        assert_eq!(engine.restore(WordId(1)), None);
        assert_ne!(engine.session_id(), session);
        assert_eq!(
            engine.setup().syllabification.options.threshold.value,
            1000.0
        );
    }

    #[test]
    fn test_warning_uses_current_focus() {
        let mut engine = engine(FeedbackOptions {
            warning: WarningOptions {
                language: "fi".into(),
                phrase: "Lue!".into(),
                threshold: Threshold::fixed(2000.0),
            },
            ..FeedbackOptions::default()
        });
        let t0 = Instant::now();

        engine.set_focused_word(Some(&WordTarget::new(1, "kala")), t0);
        assert!(engine.tick(t0).events.is_empty());
        engine.set_focused_word(None, t0);
        assert!(engine.tick(t0).events.is_empty());
        assert!(engine.tick(t0 + Duration::from_millis(1900)).events.is_empty());
        assert_eq!(
            engine.tick(t0 + Duration::from_millis(2100)).events,
            vec![FeedbackEvent::Warned {
                phrase: "Lue!".into()
            }]
        );
        assert!(engine.tick(t0 + Duration::from_millis(5000)).events.is_empty());
    }
}
