//! Replays a recorded focus trace through the feedback scheduler and prints
//! every event as a JSON line.
//!
//! ```text
//! readfeed-replay <options.json> <trace.json>
//! ```
//!
//! The trace is `{"avgWordReadingMs": 250, "steps": [{"atMs": 0, "word": {"id": 1, "text": "kala"}}, {"atMs": 900, "word": null}]}`.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tokio::time::{self, Instant};

use readfeed::{EventReceiver, FeedbackScheduler, LogSpeaker, OptionsStore, WordTarget};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Trace {
    #[serde(default)]
    avg_word_reading_ms: Option<f64>,
    /// Time to keep ticking after the last step
    #[serde(default = "default_tail_ms")]
    tail_ms: u64,
    steps: Vec<TraceStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TraceStep {
    at_ms: u64,
    word: Option<WordTarget>,
}

fn default_tail_ms() -> u64 {
    4000
}

fn print_pending(rx: &mut EventReceiver) -> Result<()> {
    while let Ok(event) = rx.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [options_path, trace_path] = args.as_slice() else {
        bail!("usage: readfeed-replay <options.json> <trace.json>");
    };

    let store = OptionsStore::new(PathBuf::from(options_path))?;
    let contents = std::fs::read_to_string(trace_path)
        .with_context(|| format!("Failed to read trace from {trace_path}"))?;
    let trace: Trace = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid trace in {trace_path}"))?;

    let (scheduler, mut rx) = FeedbackScheduler::new(store.options(), Arc::new(LogSpeaker));
    if !scheduler.init().await {
        log::warn!("no feedback modality enabled; nothing will fire");
    }
    scheduler.reset(trace.avg_word_reading_ms).await;

    let started = Instant::now();
    for step in &trace.steps {
        time::sleep_until(started + Duration::from_millis(step.at_ms)).await;
        print_pending(&mut rx)?;
        scheduler.set_focused_word(step.word.as_ref()).await;
    }

    time::sleep(Duration::from_millis(trace.tail_ms)).await;
    print_pending(&mut rx)?;

    println!("{}", serde_json::to_string(&scheduler.words().await)?);
    println!("{}", serde_json::to_string(&scheduler.setup().await)?);

    scheduler.cleanup().await;
    log::info!("replayed {} steps", trace.steps.len());
    Ok(())
}
