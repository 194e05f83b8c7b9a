#![cfg(feature = "async")]

use std::time::Duration;

use ghostbook_engine::{
    TimerEvents, TimerPreset, TimerSnapshot, TimerWorkerConfig, WorkerError, spawn_timer_worker,
    spawn_timer_worker_with_task,
};

async fn next_matching(events: &mut TimerEvents, pred: impl Fn(&TimerSnapshot) -> bool) -> TimerSnapshot {
    loop {
        let snapshot = events.recv().await.expect("worker alive");
        if pred(&snapshot) {
            return snapshot;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn cooldown_counts_down_and_finishes() {
    let (handle, mut events) = spawn_timer_worker(TimerWorkerConfig::default());
    let id = TimerPreset::HuntCooldown.id();
    handle.start(id, TimerPreset::HuntCooldown.duration_secs(), 0).unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.time_left, Some(25));

    let mut last_left = 25;
    let done = loop {
        let snapshot = events.recv().await.unwrap();
        let left = snapshot.time_left.unwrap();
        assert!(left <= last_left);
        last_left = left;
        if snapshot.is_finished() {
            break snapshot;
        }
    };
    assert_eq!(done.time_left, Some(0));
    assert_eq!(done.total_elapsed, Some(25));

    // Finished timers go quiet; a get_time now produces nothing, so the
    // next message is the stop acknowledgement.
    handle.get_time(id).unwrap();
    handle.stop(id).unwrap();
    let next = events.recv().await.unwrap();
    assert!(next.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn pause_then_resume_keeps_elapsed_time() {
    let (handle, mut events) = spawn_timer_worker(TimerWorkerConfig::default());
    let id = TimerPreset::HuntCooldown.id();
    handle.start(id, 25, 0).unwrap();
    next_matching(&mut events, |s| s.time_left == Some(15)).await;

    handle.pause(id).unwrap();
    let paused = next_matching(&mut events, TimerSnapshot::is_paused).await;
    assert_eq!(paused.total_elapsed, Some(10));

    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.start(id, 25, paused.total_elapsed.unwrap()).unwrap();
    let resumed = events.recv().await.unwrap();
    assert_eq!(resumed.time_left, Some(15));

    let done = next_matching(&mut events, TimerSnapshot::is_finished).await;
    assert_eq!(done.total_elapsed, Some(25));
}

#[tokio::test(start_paused = true)]
async fn slow_ticks_still_report_wall_clock_time() {
    let config = TimerWorkerConfig {
        tick_interval: Duration::from_secs(8),
    };
    let (handle, mut events) = spawn_timer_worker(config);
    handle.start(TimerPreset::Smudge.id(), 180, 0).unwrap();
    assert_eq!(events.recv().await.unwrap().time_left, Some(180));

    let late = events.recv().await.unwrap();
    assert_eq!(late.total_elapsed, Some(8));
    assert_eq!(late.time_left, Some(172));

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    handle.refresh_all().unwrap();
    let refreshed = events.recv().await.unwrap();
    assert_eq!(refreshed.total_elapsed, Some(11));
}

#[tokio::test(start_paused = true)]
async fn raw_messages_use_the_wire_format() {
    let (handle, mut events) = spawn_timer_worker(TimerWorkerConfig::default());
    handle
        .post_message(r#"{"action":"reset","timerId":"smudge","data":{"initialTime":180}}"#)
        .unwrap();
    let reset = events.recv().await.unwrap();
    assert!(reset.is_reset());
    assert_eq!((reset.time_left, reset.total_elapsed), (Some(180), Some(0)));

    let err = handle.post_message(r#"{"action":"start"}"#).unwrap_err();
    assert!(matches!(err, WorkerError::Decode(_)));
}

#[tokio::test(start_paused = true)]
async fn worker_exits_when_handles_drop() {
    let (handle, mut events, task) = spawn_timer_worker_with_task(TimerWorkerConfig::default());
    let spare = handle.clone();
    drop(handle);
    spare.stop("smudge").unwrap();
    assert!(events.recv().await.unwrap().is_stopped());
    drop(spare);

    task.await.unwrap();
    assert!(events.recv().await.is_none());
}
