use anyhow::{Context, Result, bail};
use colored::Colorize;
use ghostbook_engine::{
    TimerListeners, TimerPreset, TimerSnapshot, TimerWorkerConfig, format_clock, spawn_timer_worker,
};
use std::time::Duration;

use crate::util::split_csv;

#[derive(Debug, Clone)]
pub struct TimerRun {
    pub presets: Vec<TimerPreset>,
    pub elapsed_secs: u64,
    pub tick: Duration,
    pub verbose: bool,
}

/// Resolve a comma-separated list of timer ids, dropping repeats.
pub fn parse_presets(raw: &str) -> Result<Vec<TimerPreset>> {
    let mut presets = Vec::new();
    for id in split_csv(raw) {
        let preset = TimerPreset::from_id(&id)
            .with_context(|| format!("unknown timer `{id}` (expected smudge or huntCooldown)"))?;
        if !presets.contains(&preset) {
            presets.push(preset);
        }
    }
    if presets.is_empty() {
        bail!("no timers selected");
    }
    Ok(presets)
}

/// Start every requested timer on the worker and collect snapshots until
/// they have all finished.
pub async fn run_timers(run: &TimerRun) -> Result<Vec<TimerSnapshot>> {
    let (handle, mut events) = spawn_timer_worker(TimerWorkerConfig {
        tick_interval: run.tick,
    });
    let mut listeners = TimerListeners::new();

    for preset in &run.presets {
        let id = preset.id();
        let verbose = run.verbose;
        listeners.add_listener(id, move |snapshot: &TimerSnapshot| {
            let left = snapshot.time_left.unwrap_or_default();
            log::debug!("{} at {}", snapshot.timer_id, format_clock(left));
            if verbose {
                eprintln!("{} {}", format!("[{}]", snapshot.timer_id).cyan(), format_clock(left));
            }
        });
        handle
            .start(id, preset.duration_secs(), run.elapsed_secs)
            .with_context(|| format!("starting timer {id}"))?;
    }

    let mut timeline = Vec::new();
    // Each timer keeps its listener until it finishes.
    while !listeners.is_empty() {
        let Some(snapshot) = events.recv().await else {
            bail!("timer worker stopped before every timer finished");
        };
        listeners.dispatch(&snapshot);
        if snapshot.is_finished() {
            listeners.remove_listener(&snapshot.timer_id);
        }
        timeline.push(snapshot);
    }
    Ok(timeline)
}
