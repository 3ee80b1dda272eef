use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::{Interval, PomodoroFormat};

/// Every state change in the engine produces an Event.
/// UI collaborators render them and fire notifications off them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PlanGenerated {
        format: PomodoroFormat,
        total_min: u32,
        interval_count: usize,
        at: DateTime<Utc>,
    },
    TimerStarted {
        interval_id: Uuid,
        label: String,
        seconds_remaining: u64,
        /// True only for the first start of a plan.
        first_start: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// The active interval ended, naturally or by skip.
    IntervalCompleted {
        interval_id: Uuid,
        label: String,
        is_break: bool,
        early: bool,
        credited_min: u64,
        /// Work minutes accumulated including this credit, read before any
        /// end-of-plan reset.
        work_min_accumulated: u64,
        /// Set when this was the last interval and the engine has reset.
        plan_finished: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        seconds_remaining: u64,
        running: bool,
        has_started: bool,
        work_min_accumulated: u64,
        message: String,
        format: Option<PomodoroFormat>,
        total_min: Option<u32>,
        active: Option<Interval>,
        queue: Vec<Interval>,
        plan_progress_pct: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Completion events are the ones a host rings a bell for.
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::IntervalCompleted { .. })
    }
}
