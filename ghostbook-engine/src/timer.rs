//! Countdown timer state machine and its wire messages.
//!
//! Remaining time is always derived from the wall clock: a running timer
//! stores when it started plus the time already spent before that, so the
//! value is correct no matter how many ticks were actually delivered.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::constants::{
    HUNT_COOLDOWN_DURATION_SECS, HUNT_COOLDOWN_TIMER_ID, SMUDGE_DURATION_SECS, SMUDGE_TIMER_ID,
};

/// The two timers the tool ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerPreset {
    Smudge,
    HuntCooldown,
}

impl TimerPreset {
    pub const ALL: [Self; 2] = [Self::Smudge, Self::HuntCooldown];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Smudge => SMUDGE_TIMER_ID,
            Self::HuntCooldown => HUNT_COOLDOWN_TIMER_ID,
        }
    }

    /// Nominal duration in seconds; the value a reset returns to.
    #[must_use]
    pub const fn duration_secs(self) -> u64 {
        match self {
            Self::Smudge => SMUDGE_DURATION_SECS,
            Self::HuntCooldown => HUNT_COOLDOWN_DURATION_SECS,
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id().eq_ignore_ascii_case(id.trim()))
    }
}

/// `MM:SS` as shown on the timer face.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Payload of a `start` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
    pub initial_time: u64,
    #[serde(default)]
    pub elapsed_time: u64,
}

/// Payload of a `reset` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetData {
    pub initial_time: u64,
}

/// Request sent to the timer worker:
/// `{action: start|pause|stop|reset|getTime, timerId, data?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimerRequest {
    Start { timer_id: String, data: StartData },
    Pause { timer_id: String },
    Stop { timer_id: String },
    Reset { timer_id: String, data: ResetData },
    GetTime { timer_id: String },
}

impl TimerRequest {
    #[must_use]
    pub fn timer_id(&self) -> &str {
        match self {
            Self::Start { timer_id, .. }
            | Self::Pause { timer_id }
            | Self::Stop { timer_id }
            | Self::Reset { timer_id, .. }
            | Self::GetTime { timer_id } => timer_id,
        }
    }
}

/// Message delivered to listeners:
/// `{timerId, timeLeft?, totalElapsed?, isFinished?, paused?, stopped?, reset?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub timer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_left: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elapsed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<bool>,
}

impl TimerSnapshot {
    fn bare(timer_id: &str) -> Self {
        Self {
            timer_id: timer_id.to_string(),
            time_left: None,
            total_elapsed: None,
            is_finished: None,
            paused: None,
            stopped: None,
            reset: None,
        }
    }

    #[must_use]
    pub fn progress(timer_id: &str, time_left: u64, total_elapsed: u64) -> Self {
        Self {
            time_left: Some(time_left),
            total_elapsed: Some(total_elapsed),
            is_finished: Some(time_left == 0),
            ..Self::bare(timer_id)
        }
    }

    #[must_use]
    pub fn paused(timer_id: &str, total_elapsed: u64) -> Self {
        Self {
            total_elapsed: Some(total_elapsed),
            paused: Some(true),
            ..Self::bare(timer_id)
        }
    }

    #[must_use]
    pub fn stopped(timer_id: &str) -> Self {
        Self {
            stopped: Some(true),
            ..Self::bare(timer_id)
        }
    }

    #[must_use]
    pub fn reset(timer_id: &str, initial_time: u64) -> Self {
        Self {
            time_left: Some(initial_time),
            total_elapsed: Some(0),
            reset: Some(true),
            ..Self::bare(timer_id)
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_finished == Some(true)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused == Some(true)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped == Some(true)
    }

    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.reset == Some(true)
    }
}

/// A timer that is currently counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningTimer {
    pub nominal: Duration,
    pub prior_elapsed: Duration,
    pub started_at: Instant,
}

impl RunningTimer {
    #[must_use]
    pub fn total_elapsed(&self, now: Instant) -> Duration {
        self.prior_elapsed
            .saturating_add(now.saturating_duration_since(self.started_at))
    }

    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.nominal.saturating_sub(self.total_elapsed(now))
    }

    /// Whole-second view; elapsed rounds down, remaining is derived from it.
    #[must_use]
    pub fn snapshot(&self, timer_id: &str, now: Instant) -> TimerSnapshot {
        let elapsed = self.total_elapsed(now).as_secs();
        let left = self.nominal.as_secs().saturating_sub(elapsed);
        TimerSnapshot::progress(timer_id, left, elapsed)
    }
}

/// Running timers keyed by id. Idle, paused and finished timers hold no
/// entry; their displayed value lives with the consumer.
#[derive(Debug, Clone, Default)]
pub struct TimerBook {
    running: HashMap<String, RunningTimer>,
}

impl TimerBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self, timer_id: &str) -> bool {
        self.running.contains_key(timer_id)
    }

    #[must_use]
    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn get(&self, timer_id: &str) -> Option<&RunningTimer> {
        self.running.get(timer_id)
    }

    /// Begin counting. Ignored while the timer already runs. A start whose
    /// prior elapsed time already covers the duration finishes at once.
    pub fn start(
        &mut self,
        timer_id: &str,
        nominal_secs: u64,
        prior_elapsed_secs: u64,
        now: Instant,
    ) -> Option<TimerSnapshot> {
        if self.is_running(timer_id) {
            log::trace!("timer {timer_id} already running; start ignored");
            return None;
        }
        let timer = RunningTimer {
            nominal: Duration::from_secs(nominal_secs),
            prior_elapsed: Duration::from_secs(prior_elapsed_secs),
            started_at: now,
        };
        let snapshot = timer.snapshot(timer_id, now);
        if snapshot.is_finished() {
            log::debug!("timer {timer_id} started already expired");
        } else {
            log::debug!("timer {timer_id} started with {prior_elapsed_secs}s of {nominal_secs}s spent");
            self.running.insert(timer_id.to_string(), timer);
        }
        Some(snapshot)
    }

    /// Fold the current run into the total and stop counting.
    pub fn pause(&mut self, timer_id: &str, now: Instant) -> Option<TimerSnapshot> {
        let timer = self.running.remove(timer_id)?;
        let total = timer.total_elapsed(now).as_secs();
        log::debug!("timer {timer_id} paused at {total}s");
        Some(TimerSnapshot::paused(timer_id, total))
    }

    pub fn stop(&mut self, timer_id: &str) -> TimerSnapshot {
        if self.running.remove(timer_id).is_some() {
            log::debug!("timer {timer_id} stopped");
        }
        TimerSnapshot::stopped(timer_id)
    }

    pub fn reset(&mut self, timer_id: &str, nominal_secs: u64) -> TimerSnapshot {
        self.running.remove(timer_id);
        log::debug!("timer {timer_id} reset to {nominal_secs}s");
        TimerSnapshot::reset(timer_id, nominal_secs)
    }

    /// Recompute one timer on demand, e.g. when the page becomes visible again.
    pub fn get_time(&mut self, timer_id: &str, now: Instant) -> Option<TimerSnapshot> {
        let snapshot = self.running.get(timer_id)?.snapshot(timer_id, now);
        if snapshot.is_finished() {
            self.running.remove(timer_id);
        }
        Some(snapshot)
    }

    /// Snapshot every running timer and retire the finished ones.
    pub fn tick(&mut self, now: Instant) -> Vec<TimerSnapshot> {
        let mut snapshots: Vec<TimerSnapshot> = self
            .running
            .iter()
            .map(|(id, timer)| timer.snapshot(id, now))
            .collect();
        snapshots.sort_by(|a, b| a.timer_id.cmp(&b.timer_id));
        for snapshot in snapshots.iter().filter(|s| s.is_finished()) {
            log::debug!("timer {} finished", snapshot.timer_id);
            self.running.remove(&snapshot.timer_id);
        }
        snapshots
    }

    /// Route a wire request to the matching transition.
    pub fn apply(&mut self, request: &TimerRequest, now: Instant) -> Option<TimerSnapshot> {
        match request {
            TimerRequest::Start { timer_id, data } => {
                self.start(timer_id, data.initial_time, data.elapsed_time, now)
            }
            TimerRequest::Pause { timer_id } => self.pause(timer_id, now),
            TimerRequest::Stop { timer_id } => Some(self.stop(timer_id)),
            TimerRequest::Reset { timer_id, data } => Some(self.reset(timer_id, data.initial_time)),
            TimerRequest::GetTime { timer_id } => self.get_time(timer_id, now),
        }
    }
}
