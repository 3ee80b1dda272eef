//! Session planning.
//!
//! Expands a total time budget into an ordered list of work and break
//! intervals with absolute clock-face start times. Intervals are contiguous:
//! each one starts exactly when the previous one ends.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// How many total-minute choices are offered per format.
pub const OPTION_COUNT: u32 = 10;

/// Work/break lengths of one pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroFormat {
    /// Work interval length in minutes.
    pub work_min: u32,
    /// Break interval length in minutes.
    pub break_min: u32,
}

impl PomodoroFormat {
    pub const SHORT: Self = Self {
        work_min: 25,
        break_min: 5,
    };

    pub const LONG: Self = Self {
        work_min: 50,
        break_min: 15,
    };

    /// Build a custom format. Both lengths must be positive.
    pub fn new(work_min: u32, break_min: u32) -> Result<Self, ValidationError> {
        if work_min == 0 || break_min == 0 {
            return Err(ValidationError::InvalidFormat {
                work_min,
                break_min,
            });
        }
        Ok(Self {
            work_min,
            break_min,
        })
    }

    /// Preset name, if this is one of the built-in formats.
    pub fn preset_name(&self) -> Option<&'static str> {
        match *self {
            Self::SHORT => Some("short"),
            Self::LONG => Some("long"),
            _ => None,
        }
    }

    /// The total durations offered for this format: `n*(work+break) - break`
    /// for `n = 1..=10`. Every choice is a whole number of work/break pairs
    /// followed by one final work interval.
    pub fn total_minute_options(&self) -> Vec<u32> {
        let cycle = self.work_min.saturating_add(self.break_min);
        (1..=OPTION_COUNT)
            .map(|n| n.saturating_mul(cycle).saturating_sub(self.break_min))
            .collect()
    }

    /// Check that `total` is one of [`Self::total_minute_options`].
    pub fn validate_total(&self, total: u32) -> Result<u32, ValidationError> {
        let options = self.total_minute_options();
        if options.contains(&total) {
            Ok(total)
        } else {
            Err(ValidationError::TotalNotOffered { total, options })
        }
    }
}

impl fmt::Display for PomodoroFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.preset_name() {
            Some(name) => write!(f, "{name} ({}/{})", self.work_min, self.break_min),
            None => write!(f, "custom ({}/{})", self.work_min, self.break_min),
        }
    }
}

impl FromStr for PomodoroFormat {
    type Err = ValidationError;

    /// Parses the preset names `short` and `long`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::SHORT),
            "long" => Ok(Self::LONG),
            other => Err(ValidationError::UnknownFormat(other.to_string())),
        }
    }
}

/// One scheduled work or break period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub id: Uuid,
    pub label: String,
    /// Duration in minutes.
    pub duration_min: u32,
    pub is_break: bool,
    /// Expected start if the plan runs without pause (minute resolution).
    pub scheduled_start: DateTime<Utc>,
}

impl Interval {
    fn work(duration_min: u32, scheduled_start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: format!("{duration_min} Minute Session"),
            duration_min,
            is_break: false,
            scheduled_start,
        }
    }

    fn rest(duration_min: u32, scheduled_start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: format!("{duration_min} Minute Break"),
            duration_min,
            is_break: true,
            scheduled_start,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_min) * 60
    }

    pub fn scheduled_end(&self) -> DateTime<Utc> {
        self.scheduled_start + Duration::minutes(i64::from(self.duration_min))
    }
}

/// Ordered intervals produced for one total duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub intervals: Vec<Interval>,
}

impl Plan {
    /// Greedily split `total_min` into alternating work/break chunks starting
    /// at `now` truncated to the minute.
    ///
    /// A break is only emitted when at least a full break fits after a full
    /// work interval, so the plan never ends on a break. Whatever is left
    /// below one work length becomes a final, shorter work interval.
    pub fn generate(format: PomodoroFormat, total_min: u32, now: DateTime<Utc>) -> Self {
        let mut intervals = Vec::new();
        if format.work_min == 0 {
            return Self { intervals };
        }

        let mut remaining = total_min;
        let mut cursor = truncate_to_minute(now);

        while remaining > 0 {
            if remaining >= format.work_min {
                let work = Interval::work(format.work_min, cursor);
                cursor = work.scheduled_end();
                remaining -= format.work_min;
                intervals.push(work);

                if format.break_min > 0 && remaining >= format.break_min {
                    let rest = Interval::rest(format.break_min, cursor);
                    cursor = rest.scheduled_end();
                    remaining -= format.break_min;
                    intervals.push(rest);
                }
            } else {
                intervals.push(Interval::work(remaining, cursor));
                remaining = 0;
            }
        }

        Self { intervals }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn total_duration_min(&self) -> u64 {
        self.intervals
            .iter()
            .map(|i| u64::from(i.duration_min))
            .sum()
    }

    pub fn work_duration_min(&self) -> u64 {
        self.intervals
            .iter()
            .filter(|i| !i.is_break)
            .map(|i| u64::from(i.duration_min))
            .sum()
    }

    pub fn break_count(&self) -> usize {
        self.intervals.iter().filter(|i| i.is_break).count()
    }
}

/// Drop seconds and sub-seconds.
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(Duration::minutes(1)).unwrap_or(at)
}

/// Re-lay `intervals` back to back starting at `from` truncated to the minute.
pub fn restamp<'a, I>(intervals: I, from: DateTime<Utc>)
where
    I: IntoIterator<Item = &'a mut Interval>,
{
    let mut cursor = truncate_to_minute(from);
    for interval in intervals {
        interval.scheduled_start = cursor;
        cursor = interval.scheduled_end();
    }
}
