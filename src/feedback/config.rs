use std::time::Duration;

/// Timing of the feedback loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Tick period; also the amount each tick adds to or removes from a
    /// word's accumulated focus.
    pub tick_interval: Duration,

    /// Accumulated focus after which a visit counts as a confirmed focus
    pub focus_threshold_ms: u64,

    /// Returning to a word later than this counts as a new entry
    pub reentry_threshold: Duration,

    /// Delay before a temporary syllabification is reverted
    pub revert_delay: Duration,

    /// Log every word's accumulator on every tick
    pub trace_ticks: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(30),
            focus_threshold_ms: 150,
            reentry_threshold: Duration::from_millis(1000),
            revert_delay: Duration::from_millis(3000),
            trace_ticks: false,
        }
    }
}

impl SchedulerConfig {
    /// Defaults, with per-tick tracing switched on by `READFEED_DEBUG=1|true`.
    pub fn from_env() -> Self {
        let trace_ticks = std::env::var("READFEED_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            trace_ticks,
            ..Self::default()
        }
    }

    pub fn sample_ms(&self) -> u64 {
        self.tick_interval.as_millis() as u64
    }
}
