//! Background timer worker.
//!
//! One tokio task owns the [`TimerBook`]. Callers talk to it through a
//! cloneable [`TimerHandle`] and read snapshots from [`TimerEvents`]. The task
//! exits once every handle has been dropped.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::constants::DEFAULT_TICK_MILLIS;
use crate::timer::{ResetData, StartData, TimerBook, TimerRequest, TimerSnapshot};

/// Worker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerWorkerConfig {
    pub tick_interval: Duration,
}

impl Default for TimerWorkerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MILLIS),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("timer worker has shut down")]
    Closed,
    #[error("malformed timer request: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug)]
enum Command {
    Request(TimerRequest),
    RefreshAll,
}

/// Sending side of the worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl TimerHandle {
    fn send(&self, command: Command) -> Result<(), WorkerError> {
        self.commands.send(command).map_err(|_| WorkerError::Closed)
    }

    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn request(&self, request: TimerRequest) -> Result<(), WorkerError> {
        self.send(Command::Request(request))
    }

    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn start(&self, timer_id: &str, initial_time: u64, elapsed_time: u64) -> Result<(), WorkerError> {
        self.request(TimerRequest::Start {
            timer_id: timer_id.to_string(),
            data: StartData {
                initial_time,
                elapsed_time,
            },
        })
    }

    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn pause(&self, timer_id: &str) -> Result<(), WorkerError> {
        self.request(TimerRequest::Pause {
            timer_id: timer_id.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn stop(&self, timer_id: &str) -> Result<(), WorkerError> {
        self.request(TimerRequest::Stop {
            timer_id: timer_id.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn reset(&self, timer_id: &str, initial_time: u64) -> Result<(), WorkerError> {
        self.request(TimerRequest::Reset {
            timer_id: timer_id.to_string(),
            data: ResetData { initial_time },
        })
    }

    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn get_time(&self, timer_id: &str) -> Result<(), WorkerError> {
        self.request(TimerRequest::GetTime {
            timer_id: timer_id.to_string(),
        })
    }

    /// Recompute every running timer now, e.g. after the display was hidden.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Closed`] if the worker task has exited.
    pub fn refresh_all(&self) -> Result<(), WorkerError> {
        self.send(Command::RefreshAll)
    }

    /// Accept a raw JSON request in the worker wire format.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Decode`] for malformed input and
    /// [`WorkerError::Closed`] if the worker task has exited.
    pub fn post_message(&self, json: &str) -> Result<(), WorkerError> {
        let request: TimerRequest = serde_json::from_str(json)?;
        self.request(request)
    }
}

/// Receiving side for snapshots emitted by the worker.
#[derive(Debug)]
pub struct TimerEvents {
    snapshots: mpsc::UnboundedReceiver<TimerSnapshot>,
}

impl TimerEvents {
    /// Next snapshot, or `None` once the worker has exited and the queue is drained.
    pub async fn recv(&mut self) -> Option<TimerSnapshot> {
        self.snapshots.recv().await
    }
}

/// Spawn the worker task on the current tokio runtime.
#[must_use]
pub fn spawn_timer_worker(config: TimerWorkerConfig) -> (TimerHandle, TimerEvents) {
    let (handle, events, _task) = spawn_timer_worker_with_task(config);
    (handle, events)
}

/// Like [`spawn_timer_worker`], also returning the task so callers can await shutdown.
#[must_use]
pub fn spawn_timer_worker_with_task(
    config: TimerWorkerConfig,
) -> (TimerHandle, TimerEvents, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_worker(config, command_rx, snapshot_tx));
    (
        TimerHandle {
            commands: command_tx,
        },
        TimerEvents {
            snapshots: snapshot_rx,
        },
        task,
    )
}

async fn run_worker(
    config: TimerWorkerConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: mpsc::UnboundedSender<TimerSnapshot>,
) {
    let mut book = TimerBook::new();
    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;
    log::debug!("timer worker started, ticking every {:?}", config.tick_interval);

    loop {
        let emitted: Vec<TimerSnapshot> = tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Request(request)) => {
                    book.apply(&request, Instant::now().into_std()).into_iter().collect()
                }
                Some(Command::RefreshAll) => book.tick(Instant::now().into_std()),
                None => break,
            },
            _ = ticker.tick() => book.tick(Instant::now().into_std()),
        };
        for snapshot in emitted {
            if snapshots.send(snapshot).is_err() {
                log::debug!("timer listeners gone, worker exiting");
                return;
            }
        }
    }
    log::debug!("timer worker stopped with {} timer(s) running", book.running_count());
}

type Listener = Box<dyn FnMut(&TimerSnapshot) + Send>;

/// Consumer-side registry: at most one listener per timer id.
#[derive(Default)]
pub struct TimerListeners {
    listeners: HashMap<String, Listener>,
}

impl TimerListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `timer_id`, replacing any earlier one.
    pub fn add_listener<F>(&mut self, timer_id: &str, listener: F)
    where
        F: FnMut(&TimerSnapshot) + Send + 'static,
    {
        if self
            .listeners
            .insert(timer_id.to_string(), Box::new(listener))
            .is_some()
        {
            log::trace!("replaced listener for timer {timer_id}");
        }
    }

    pub fn remove_listener(&mut self, timer_id: &str) -> bool {
        self.listeners.remove(timer_id).is_some()
    }

    /// Route a snapshot to its listener. Returns false when nobody listens.
    pub fn dispatch(&mut self, snapshot: &TimerSnapshot) -> bool {
        match self.listeners.get_mut(&snapshot.timer_id) {
            Some(listener) => {
                listener(snapshot);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for TimerListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerListeners")
            .field("timer_ids", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn listeners_replace_and_route() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = TimerListeners::new();

        let first = Arc::clone(&seen);
        listeners.add_listener("smudge", move |s| first.lock().unwrap().push(("first", s.time_left)));
        let second = Arc::clone(&seen);
        listeners.add_listener("smudge", move |s| second.lock().unwrap().push(("second", s.time_left)));
        assert_eq!(listeners.len(), 1);

        assert!(listeners.dispatch(&TimerSnapshot::progress("smudge", 170, 10)));
        assert!(!listeners.dispatch(&TimerSnapshot::stopped("huntCooldown")));
        assert_eq!(*seen.lock().unwrap(), vec![("second", Some(170))]);
        assert!(listeners.remove_listener("smudge"));
        assert!(listeners.is_empty());
    }

    #[test]
    fn default_tick_is_one_second() {
        assert_eq!(TimerWorkerConfig::default().tick_interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn post_message_rejects_garbage() {
        let (handle, _events) = spawn_timer_worker(TimerWorkerConfig::default());
        let err = handle.post_message(r#"{"action":"explode"}"#).unwrap_err();
        assert!(matches!(err, WorkerError::Decode(_)));
    }
}
