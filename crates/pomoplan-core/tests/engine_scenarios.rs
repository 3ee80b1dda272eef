//! Integration tests for the countdown engine.
//!
//! Drives full plans through a manual clock: natural completion, skips,
//! pause/resume cycles and irregular tick timing.

use chrono::{TimeZone, Utc};
use pomoplan_core::timer::MSG_COMPLETE;
use pomoplan_core::{CountdownEngine, Event, ManualClock, PomodoroFormat};

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 14, 3, 27).unwrap())
}

/// Advance `secs` seconds, ticking every `step_ms` milliseconds (the last
/// step is shortened to land exactly on `secs`).
fn run_for(engine: &mut CountdownEngine<ManualClock>, clock: &ManualClock, secs: i64, step_ms: i64) -> Vec<Event> {
    let mut events = Vec::new();
    let mut left = secs * 1000;
    while left > 0 {
        let step = step_ms.min(left);
        clock.advance_millis(step);
        left -= step;
        if let Some(event) = engine.tick() {
            events.push(event);
        }
    }
    events
}

#[test]
fn test_short_55_end_to_end() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());

    engine.generate(PomodoroFormat::SHORT, 55);
    let shape: Vec<(u32, bool)> = engine
        .queue()
        .iter()
        .map(|i| (i.duration_min, i.is_break))
        .collect();
    assert_eq!(shape, vec![(25, false), (5, true), (25, false)]);

    engine.start();
    let events = run_for(&mut engine, &clock, 25 * 60, 1000);
    assert_eq!(events.len(), 1);
    assert_eq!(engine.work_min_accumulated(), 25);
    assert!(engine.active().unwrap().is_break);

    clock.advance_secs(2 * 60);
    engine.tick();
    let skipped = engine.skip().unwrap();
    assert!(matches!(
        skipped,
        Event::IntervalCompleted {
            is_break: true,
            early: true,
            credited_min: 0,
            ..
        }
    ));
    assert_eq!(engine.work_min_accumulated(), 25);
    assert_eq!(engine.active().unwrap().duration_min, 25);

    run_for(&mut engine, &clock, 25 * 60 - 1, 1000);
    assert_eq!(engine.seconds_remaining(), 1);
    assert_eq!(engine.work_min_accumulated(), 25);

    let last = run_for(&mut engine, &clock, 1, 1000);
    match last.as_slice() {
        [Event::IntervalCompleted {
            credited_min,
            work_min_accumulated,
            plan_finished,
            ..
        }] => {
            assert_eq!(*credited_min, 25);
            assert_eq!(*work_min_accumulated, 50);
            assert!(*plan_finished);
        }
        other => panic!("Expected one final completion, got {other:?}"),
    }
    assert!(engine.queue().is_empty());
    assert!(!engine.running());
    assert!(!engine.has_started());
    assert_eq!(engine.message(), MSG_COMPLETE);
}

#[test]
fn test_drift_free_with_jittered_ticks() {
    for step_ms in [1000, 250, 333, 1700, 4999] {
        let clock = clock();
        let mut engine = CountdownEngine::with_clock(clock.clone());
        engine.generate(PomodoroFormat::LONG, 50);
        let initial = engine.seconds_remaining();

        engine.start();
        run_for(&mut engine, &clock, 600, step_ms);
        engine.pause();
        clock.advance_secs(7_777);
        engine.resume();
        run_for(&mut engine, &clock, 900, step_ms);

        assert_eq!(
            engine.seconds_remaining(),
            initial - 600 - 900,
            "drift with tick step {step_ms}ms"
        );
    }
}

#[test]
fn test_many_pause_cycles_keep_exact_time() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());
    engine.generate(PomodoroFormat::SHORT, 25);
    engine.start();

    for cycle in 0..40 {
        run_for(&mut engine, &clock, 10, 400);
        engine.pause();
        clock.advance_secs(60 + cycle);
        engine.resume();
    }
    engine.tick();
    assert_eq!(engine.seconds_remaining(), 1500 - 400);
}

#[test]
fn test_missed_ticks_catch_up_in_one_call() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());
    engine.generate(PomodoroFormat::SHORT, 55);
    engine.start();

    clock.advance_secs(17 * 60 + 30);
    assert!(engine.tick().is_none());
    assert_eq!(engine.seconds_remaining(), 7 * 60 + 30);
}

#[test]
fn test_skip_work_credits_elapsed_minutes_only() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());
    engine.generate(PomodoroFormat::LONG, 115);
    engine.start();

    run_for(&mut engine, &clock, 19 * 60 + 45, 1000);
    engine.skip();
    assert_eq!(engine.work_min_accumulated(), 19);

    // Break completes naturally and credits nothing.
    run_for(&mut engine, &clock, 15 * 60, 1000);
    assert_eq!(engine.work_min_accumulated(), 19);
    assert!(!engine.active().unwrap().is_break);
}

#[test]
fn test_skip_after_resume_credits_only_since_resume() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());
    engine.generate(PomodoroFormat::SHORT, 55);
    engine.start();

    run_for(&mut engine, &clock, 10 * 60, 1000);
    engine.pause();
    clock.advance_secs(30 * 60);
    engine.resume();
    run_for(&mut engine, &clock, 5 * 60, 1000);
    assert_eq!(engine.seconds_remaining(), 10 * 60);

    let event = engine.skip().unwrap();
    assert!(matches!(event, Event::IntervalCompleted { credited_min: 5, early: true, .. }));
    assert_eq!(engine.work_min_accumulated(), 5);
}

#[test]
fn test_single_interval_plan_never_breaks() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());
    engine.generate(PomodoroFormat::SHORT, 25);
    assert_eq!(engine.queue().len(), 1);
    engine.start();

    let events = run_for(&mut engine, &clock, 25 * 60, 1000);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        Event::IntervalCompleted {
            is_break: false,
            plan_finished: true,
            ..
        }
    ));
}

#[test]
fn test_events_serialize_tagged() {
    let clock = clock();
    let mut engine = CountdownEngine::with_clock(clock.clone());
    let event = engine.generate(PomodoroFormat::SHORT, 85).unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "PlanGenerated");
    assert_eq!(json["interval_count"], 5);

    let snapshot = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["queue"].as_array().unwrap().len(), 5);

    engine.start();
    clock.advance_secs(7 * 60 + 30);
    let completed = serde_json::to_value(engine.skip().unwrap()).unwrap();
    assert_eq!(completed["type"], "IntervalCompleted");
    assert_eq!(completed["credited_min"], 7);
    assert_eq!(completed["work_min_accumulated"], 7);
    assert_eq!(completed["plan_finished"], false);
}
