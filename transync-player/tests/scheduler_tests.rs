//! Sync scheduler timing tests
//!
//! Runs real sessions against the wall-clock simulated engine and checks the
//! scheduler's advance behavior:
//! - one advance (and one notification) per crossed boundary
//! - no ghost advance from a stale deadline after a seek
//! - no advance while paused
//! - clamping at the last segment
//! - prompt, idempotent shutdown
//!
//! Segments are milliseconds long so the suite stays fast; waits are generous
//! to tolerate loaded CI machines.

mod helpers;

use std::thread;
use std::time::{Duration, Instant};

use helpers::{paused_config, segments_ms, segments_secs, wait_until, RecordingListener};
use transync_player::config::SessionConfig;
use transync_player::playback::SimulatedEngine;
use transync_player::sync::SchedulerState;
use transync_player::Session;

#[test]
fn test_advances_once_per_boundary() {
    let session = Session::new(
        segments_ms(&[(0, 100), (100, 200), (200, 60_000)]),
        SimulatedEngine::new(),
        SessionConfig::default(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    assert!(wait_until(Duration::from_secs(3), || session.current_segment() == 2));

    // Nothing more to cross for a long while
    thread::sleep(Duration::from_millis(150));
    assert_eq!(listener.seen(), vec![1, 2]);
    assert_eq!(session.current_segment(), 2);
}

#[test]
fn test_seek_mid_wait_has_no_ghost_advance() {
    // Playback at 4s, scheduler waiting ~1s for segment 0 to end
    let session = Session::new(
        segments_secs(&[(0, 5), (5, 10), (10, 15)]),
        SimulatedEngine::at(Duration::from_secs(4)),
        SessionConfig::default(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(session.jump_to(2).unwrap());

    // Well past the stale segment-0 deadline
    thread::sleep(Duration::from_millis(1_500));

    assert_eq!(session.current_segment(), 2);
    assert_eq!(listener.seen(), vec![2]);
    let elapsed = session.elapsed().unwrap();
    assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(15));
}

#[test]
fn test_backward_seek_reschedules_from_new_segment() {
    let session = Session::new(
        segments_ms(&[(0, 300), (300, 600), (600, 60_000)]),
        SimulatedEngine::new(),
        SessionConfig::default(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    assert!(wait_until(Duration::from_secs(3), || session.current_segment() == 1));
    assert!(session.seek(-1).unwrap());
    assert_eq!(session.current_segment(), 0);

    // Segment 0 plays out again from its start
    assert!(wait_until(Duration::from_secs(3), || listener.seen().len() == 3));
    assert_eq!(listener.seen(), vec![1, 0, 1]);
}

#[test]
fn test_paused_playback_never_advances() {
    let session = Session::new(
        segments_ms(&[(0, 100), (100, 60_000)]),
        SimulatedEngine::new(),
        paused_config(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    thread::sleep(Duration::from_millis(300));
    assert_eq!(session.current_segment(), 0);
    assert!(listener.seen().is_empty());

    // Resume wakes the parked scheduler
    assert!(session.pause_resume().unwrap());
    assert!(wait_until(Duration::from_secs(3), || session.current_segment() == 1));
    assert_eq!(listener.seen(), vec![1]);
}

#[test]
fn test_pause_mid_wait_cancels_deadline() {
    let session = Session::new(
        segments_ms(&[(0, 250), (250, 60_000)]),
        SimulatedEngine::new(),
        SessionConfig::default(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(!session.pause_resume().unwrap());

    thread::sleep(Duration::from_millis(500));
    assert_eq!(session.current_segment(), 0);
    assert!(listener.seen().is_empty());
}

#[test]
fn test_end_of_transcript_clamps() {
    let session = Session::new(
        segments_ms(&[(0, 50), (50, 100)]),
        SimulatedEngine::new(),
        SessionConfig::default(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    thread::sleep(Duration::from_millis(400));

    assert_eq!(session.current_segment(), 1);
    assert_eq!(listener.seen(), vec![1]);
    assert!(!session.seek(1).unwrap());
}

#[test]
fn test_natural_advances_are_monotonic() {
    let session = Session::new(
        segments_ms(&[(0, 40), (40, 80), (80, 120), (120, 160), (160, 60_000)]),
        SimulatedEngine::new(),
        SessionConfig::default(),
    );
    let listener = RecordingListener::new();
    session.attach(&listener);

    session.start().unwrap();
    assert!(wait_until(Duration::from_secs(3), || session.current_segment() == 4));

    let seen = listener.seen();
    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_boundary_tolerance_advances_early() {
    let config = SessionConfig {
        boundary_tolerance: Duration::from_millis(900),
        ..SessionConfig::default()
    };
    let session = Session::new(
        segments_ms(&[(0, 1_000), (1_000, 60_000)]),
        SimulatedEngine::new(),
        config,
    );

    let started = Instant::now();
    session.start().unwrap();
    assert!(wait_until(Duration::from_secs(3), || session.current_segment() == 1));
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[test]
fn test_empty_transcript_runs_and_stops() {
    let session = Session::new(Vec::new(), SimulatedEngine::new(), SessionConfig::default());
    session.start().unwrap();
    assert!(!session.seek(0).unwrap());
    assert!(!session.jump_to(0).unwrap());
    session.shutdown().unwrap();
}

#[test]
fn test_shutdown_twice_is_prompt() {
    let session = Session::new(
        segments_secs(&[(0, 30), (30, 60)]),
        SimulatedEngine::new(),
        SessionConfig::default(),
    );
    session.start().unwrap();
    assert_eq!(session.scheduler_state(), SchedulerState::Running);

    // Scheduler is mid-wait on a 30s deadline
    thread::sleep(Duration::from_millis(30));

    let first = Instant::now();
    session.shutdown().unwrap();
    assert!(first.elapsed() < Duration::from_secs(1));
    assert_eq!(session.scheduler_state(), SchedulerState::Stopped);
    assert!(!session.is_playing());

    let second = Instant::now();
    session.shutdown().unwrap();
    assert!(second.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_shutdown_while_paused_is_prompt() {
    let session = Session::new(
        segments_secs(&[(0, 30)]),
        SimulatedEngine::new(),
        paused_config(),
    );
    session.start().unwrap();
    thread::sleep(Duration::from_millis(30));

    let started = Instant::now();
    session.shutdown().unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}
