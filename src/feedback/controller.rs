use std::{sync::Arc, time::Duration};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::options::{FeedbackOptions, Feedbacks};
use crate::speech::Speaker;
use crate::syllabify::Syllabifier;

use super::config::SchedulerConfig;
use super::engine::{FeedbackEngine, PendingRevert};
use super::events::{EventReceiver, EventSink};
use super::state::{WordFocusSnapshot, WordId, WordTarget};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Drives a [`FeedbackEngine`] from a fixed-rate tick and sends its events
/// out over a channel.
///
/// Cloning is cheap and every clone controls the same session, so the gaze
/// side and the session controller can each hold one.
#[derive(Clone)]
pub struct FeedbackScheduler {
    engine: Arc<Mutex<FeedbackEngine>>,
    events: EventSink,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    revert_delay: Duration,
}

impl FeedbackScheduler {
    pub fn new(options: FeedbackOptions, speaker: Arc<dyn Speaker>) -> (Self, EventReceiver) {
        Self::with_config(options, speaker, SchedulerConfig::from_env())
    }

    pub fn with_config(
        options: FeedbackOptions,
        speaker: Arc<dyn Speaker>,
        config: SchedulerConfig,
    ) -> (Self, EventReceiver) {
        let (events, rx) = EventSink::channel();
        let tick_interval = config.tick_interval;
        let revert_delay = config.revert_delay;

        let scheduler = Self {
            engine: Arc::new(Mutex::new(FeedbackEngine::new(options, speaker, config))),
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval,
            revert_delay,
        };
        (scheduler, rx)
    }

    /// Starts ticking when any modality is enabled; stays dormant otherwise.
    /// Calling it again restarts the loop with an empty registry.
    pub async fn init(&self) -> bool {
        let enabled = {
            let mut engine = self.engine.lock().await;
            engine.clear();
            engine.enabled()
        };

        if enabled {
            self.spawn_ticker().await;
            log_info!("feedback loop started ({:?} ticks)", self.tick_interval);
        } else {
            self.cancel_ticker().await;
            log_info!("no feedback enabled, staying dormant");
        }
        enabled
    }

    pub async fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Reports a focus change; `None` when gaze is off the text. Returns the
    /// focused word's text.
    pub async fn set_focused_word(&self, target: Option<&WordTarget>) -> Option<String> {
        self.engine
            .lock()
            .await
            .set_focused_word(target, Instant::now())
    }

    pub async fn reset(&self, avg_word_reading_ms: Option<f64>) {
        self.engine.lock().await.reset(avg_word_reading_ms);
    }

    /// Stops ticking and drops all session state. Safe to call at any time,
    /// any number of times.
    pub async fn cleanup(&self) {
        self.cancel_ticker().await;
        self.engine.lock().await.clear();
    }

    pub async fn setup(&self) -> Feedbacks {
        self.engine.lock().await.setup()
    }

    pub async fn syllabifier(&self) -> Syllabifier {
        self.engine.lock().await.syllabifier().clone()
    }

    pub async fn word_state(&self, id: WordId) -> Option<WordFocusSnapshot> {
        self.engine.lock().await.word_state(id)
    }

    pub async fn words(&self) -> Vec<WordFocusSnapshot> {
        self.engine.lock().await.words()
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let engine = self.engine.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;
        let revert_delay = self.revert_delay;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; start sampling one period in
            interval.tick().await;

            loop {
                interval.tick().await;

                let outcome = engine.lock().await.tick(Instant::now());

                events.emit_all(outcome.events);
                for revert in outcome.reverts {
                    spawn_revert(engine.clone(), events.clone(), revert, revert_delay);
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

/// Reverts a temporary syllabification after `delay` unless its token is
/// cancelled first.
fn spawn_revert(
    engine: Arc<Mutex<FeedbackEngine>>,
    events: EventSink,
    revert: PendingRevert,
    delay: Duration,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = revert.token.cancelled() => {
                log_debug!("revert of {} cancelled", revert.word);
            }
            _ = time::sleep(delay) => {
                let restored = {
                    let mut engine = engine.lock().await;
                    if revert.token.is_cancelled() {
                        None
                    } else {
                        engine.restore(revert.word)
                    }
                };
                if let Some(event) = restored {
                    events.emit(event);
                }
            }
        }
    });
}
