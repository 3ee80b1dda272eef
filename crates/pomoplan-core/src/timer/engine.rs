//! Countdown engine implementation.
//!
//! The engine is a wall-clock-anchored state machine over a queue of planned
//! intervals. It owns no thread; the host calls `tick()` at least once per
//! second while running (see [`CountdownEngine::next_wake`]) and may call it
//! late, early or not at all. Remaining time is always recomputed as
//! `anchor_secs - (now - anchor)`, never decremented per tick, so irregular
//! scheduling and any number of pause/resume cycles cause no drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --generate--> Ready --start--> Running <--pause/resume--> Paused
//!                                        |
//!                     tick at zero / skip: pop interval, re-arm or reset
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new();
//! engine.generate(PomodoroFormat::SHORT, 55);
//! engine.start();
//! // In a loop, sleeping engine.next_wake():
//! engine.tick(); // Returns Some(Event) when an interval completes
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::plan::{restamp, Interval, Plan, PomodoroFormat};
use crate::clock::{Clock, SystemClock};
use crate::events::Event;

pub const MSG_SETUP_FIRST: &str = "Please set up sessions first";
pub const MSG_STARTED: &str = "Session Started. Good Luck!";
pub const MSG_PAUSED: &str = "Session Paused";
pub const MSG_RESUMED: &str = "Session Resumed";
pub const MSG_COMPLETE: &str = "Session complete!";

/// Countdown shown while no plan is loaded.
pub const IDLE_SECONDS: u64 = 25 * 60;

/// Core countdown engine.
///
/// All mutable timing state (anchor, running flag, remaining seconds) lives
/// in this one record so the reanchoring rule can be checked in one place.
#[derive(Debug, Clone)]
pub struct CountdownEngine<C: Clock = SystemClock> {
    clock: C,
    format: Option<PomodoroFormat>,
    total_min: Option<u32>,
    queue: VecDeque<Interval>,
    seconds_remaining: u64,
    running: bool,
    has_started: bool,
    work_secs: u64,
    /// Wall-clock instant from which elapsed running time is measured.
    /// `Some` exactly while running.
    anchor: Option<DateTime<Utc>>,
    /// `seconds_remaining` at the moment of the last reanchor.
    anchor_secs: u64,
    /// Last start or resume of the active interval; early credit counts from here.
    interval_started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    message: String,
}

impl CountdownEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for CountdownEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CountdownEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            format: None,
            total_min: None,
            queue: VecDeque::new(),
            seconds_remaining: IDLE_SECONDS,
            running: false,
            has_started: false,
            work_secs: 0,
            anchor: None,
            anchor_secs: IDLE_SECONDS,
            interval_started_at: None,
            paused_at: None,
            message: String::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn work_min_accumulated(&self) -> u64 {
        self.work_secs / 60
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn queue(&self) -> &VecDeque<Interval> {
        &self.queue
    }

    pub fn active(&self) -> Option<&Interval> {
        self.queue.front()
    }

    pub fn format(&self) -> Option<PomodoroFormat> {
        self.format
    }

    pub fn total_min(&self) -> Option<u32> {
        self.total_min
    }

    /// 0.0 .. 100.0 progress across the whole plan.
    pub fn plan_progress_pct(&self) -> f64 {
        let Some(total) = self.total_min.filter(|t| *t > 0) else {
            return 0.0;
        };
        let queued_after_head: u64 = self.queue.iter().skip(1).map(Interval::duration_secs).sum();
        let left = self.seconds_remaining + queued_after_head;
        let total_secs = u64::from(total) * 60;
        let done = total_secs.saturating_sub(left) as f64;
        (done / total_secs as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// How long the host may sleep before the next `tick()`.
    ///
    /// While running this is the time until elapsed running time crosses the
    /// next whole second, so a host that honours it sees every second
    /// boundary. `None` means no reactivation is pending.
    pub fn next_wake(&self) -> Option<std::time::Duration> {
        let anchor = self.anchor.filter(|_| self.running)?;
        let elapsed_ms = (self.clock.now() - anchor).num_milliseconds().max(0);
        let until_boundary = 1000 - elapsed_ms % 1000;
        Some(std::time::Duration::from_millis(until_boundary as u64))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            seconds_remaining: self.seconds_remaining,
            running: self.running,
            has_started: self.has_started,
            work_min_accumulated: self.work_min_accumulated(),
            message: self.message.clone(),
            format: self.format,
            total_min: self.total_min,
            active: self.queue.front().cloned(),
            queue: self.queue.iter().cloned().collect(),
            plan_progress_pct: self.plan_progress_pct(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record the chosen format without regenerating.
    pub fn select_format(&mut self, format: PomodoroFormat) {
        self.format = Some(format);
    }

    /// Record the chosen total without regenerating.
    pub fn select_total(&mut self, total_min: u32) {
        self.total_min = Some(total_min);
    }

    /// Regenerate from the recorded selection. No-op unless both a format
    /// and a positive total have been selected.
    pub fn generate_selected(&mut self) -> Option<Event> {
        let format = self.format?;
        let total = self.total_min?;
        self.generate(format, total)
    }

    /// Replace the plan wholesale and reset accounting.
    ///
    /// A non-positive total leaves the current queue untouched.
    pub fn generate(&mut self, format: PomodoroFormat, total_min: u32) -> Option<Event> {
        if total_min == 0 {
            return None;
        }
        let now = self.clock.now();
        let plan = Plan::generate(format, total_min, now);
        let head_secs = plan.intervals.first()?.duration_secs();

        let interval_count = plan.len();
        self.format = Some(format);
        self.total_min = Some(total_min);
        self.queue = plan.intervals.into();
        self.seconds_remaining = head_secs;
        self.anchor_secs = head_secs;
        self.running = false;
        self.has_started = false;
        self.anchor = None;
        self.work_secs = 0;
        self.interval_started_at = None;
        self.paused_at = None;

        info!(%format, total_min, interval_count, "plan generated");
        Some(Event::PlanGenerated {
            format,
            total_min,
            interval_count,
            at: now,
        })
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            self.message = MSG_SETUP_FIRST.into();
            return None;
        }
        if self.running {
            return None;
        }
        if self.has_started {
            return self.resume();
        }

        let now = self.clock.now();
        self.has_started = true;
        // The plan may have been configured long before it was started.
        restamp(self.queue.iter_mut(), now);
        self.interval_started_at = Some(now);
        self.paused_at = None;
        self.message = MSG_STARTED.into();
        self.reanchor(now);

        let head = self.queue.front()?;
        info!(label = %head.label, "plan started");
        Some(Event::TimerStarted {
            interval_id: head.id,
            label: head.label.clone(),
            seconds_remaining: self.seconds_remaining,
            first_start: true,
            at: now,
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        let now = self.clock.now();
        // Flush whole seconds elapsed since the last tick. Hitting zero here
        // is left for the next tick after resume to complete.
        self.seconds_remaining = self.remaining_at(now);
        self.running = false;
        self.anchor = None;
        self.anchor_secs = self.seconds_remaining;
        self.paused_at = Some(now);
        self.message = MSG_PAUSED.into();

        debug!(seconds_remaining = self.seconds_remaining, "paused");
        Some(Event::TimerPaused {
            seconds_remaining: self.seconds_remaining,
            at: now,
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            self.message = MSG_SETUP_FIRST.into();
            return None;
        }
        if self.running {
            return None;
        }
        if !self.has_started {
            return self.start();
        }

        let now = self.clock.now();
        self.paused_at = None;
        self.interval_started_at = Some(now);
        self.message = MSG_RESUMED.into();
        self.reanchor(now);

        debug!(seconds_remaining = self.seconds_remaining, "resumed");
        Some(Event::TimerResumed {
            seconds_remaining: self.seconds_remaining,
            at: now,
        })
    }

    /// Start, pause or resume depending on the current state.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else if self.has_started {
            self.resume()
        } else {
            self.start()
        }
    }

    /// Call periodically. Returns `Some(Event::IntervalCompleted)` when the
    /// active interval runs out.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        let now = self.clock.now();
        let remaining = self.remaining_at(now);
        if remaining == 0 {
            self.seconds_remaining = 0;
            return self.complete_at(false, now);
        }
        self.seconds_remaining = remaining;
        None
    }

    /// End the active interval early. Work intervals are credited with the
    /// whole minutes actually spent running.
    pub fn skip(&mut self) -> Option<Event> {
        self.complete(true)
    }

    /// End the active interval, naturally or early. No-op on an empty queue.
    pub fn complete(&mut self, early: bool) -> Option<Event> {
        let now = self.clock.now();
        self.complete_at(early, now)
    }

    /// Return to the idle state, dropping the plan and the selection.
    pub fn reset(&mut self) -> Option<Event> {
        self.clear();
        info!("engine reset");
        Some(Event::TimerReset {
            at: self.clock.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Enter the running state preserving `seconds_remaining` exactly.
    fn reanchor(&mut self, now: DateTime<Utc>) {
        self.anchor = Some(now);
        self.anchor_secs = self.seconds_remaining;
        self.running = true;
        debug!(anchor_secs = self.anchor_secs, %now, "reanchored");
    }

    fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        let Some(anchor) = self.anchor else {
            return self.seconds_remaining;
        };
        let elapsed = (now - anchor).num_seconds();
        if elapsed < 0 {
            warn!(%anchor, %now, "wall clock moved backwards");
            return self.seconds_remaining;
        }
        self.anchor_secs.saturating_sub(elapsed as u64)
    }

    /// Running seconds spent in the active interval.
    fn elapsed_in_interval(&self, now: DateTime<Utc>) -> u64 {
        let Some(started) = self.interval_started_at else {
            return 0;
        };
        let until = if self.running {
            now
        } else {
            self.paused_at.unwrap_or(now)
        };
        (until - started).num_seconds().max(0) as u64
    }

    fn complete_at(&mut self, early: bool, now: DateTime<Utc>) -> Option<Event> {
        let credited_min = {
            let finished = self.queue.front()?;
            if finished.is_break {
                0
            } else if early {
                self.elapsed_in_interval(now) / 60
            } else {
                u64::from(finished.duration_min)
            }
        };
        let finished = self.queue.pop_front()?;
        self.work_secs += credited_min * 60;
        let work_min_accumulated = self.work_min_accumulated();

        let plan_finished = match self.queue.front() {
            Some(next) => {
                self.seconds_remaining = next.duration_secs();
                restamp(self.queue.iter_mut(), now);
                self.interval_started_at = Some(now);
                if self.running {
                    self.paused_at = None;
                    self.reanchor(now);
                } else {
                    self.anchor_secs = self.seconds_remaining;
                    self.paused_at = Some(now);
                }
                false
            }
            None => {
                self.clear();
                true
            }
        };
        self.message = MSG_COMPLETE.into();

        info!(
            label = %finished.label,
            is_break = finished.is_break,
            early,
            credited_min,
            plan_finished,
            "interval completed"
        );
        Some(Event::IntervalCompleted {
            interval_id: finished.id,
            label: finished.label,
            is_break: finished.is_break,
            early,
            credited_min,
            work_min_accumulated,
            plan_finished,
            at: now,
        })
    }

    fn clear(&mut self) {
        self.format = None;
        self.total_min = None;
        self.queue.clear();
        self.seconds_remaining = IDLE_SECONDS;
        self.anchor_secs = IDLE_SECONDS;
        self.running = false;
        self.has_started = false;
        self.work_secs = 0;
        self.anchor = None;
        self.interval_started_at = None;
        self.paused_at = None;
        self.message.clear();
    }
}
