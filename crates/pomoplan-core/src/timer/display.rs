//! Human-readable renderings shared by every front end.

use chrono::{DateTime, Local, Utc};

/// `MM:SS` countdown. Minutes are not wrapped into hours.
pub fn format_countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Label for a total-minute choice, e.g. `1 hr 25 min`.
pub fn format_total(total_min: u32) -> String {
    let hours = total_min / 60;
    let minutes = total_min % 60;
    let hours_part = match hours {
        0 => None,
        1 => Some("1 hr".to_string()),
        h => Some(format!("{h} hrs")),
    };
    match (hours_part, minutes) {
        (None, m) => format!("{m} min"),
        (Some(h), 0) => h,
        (Some(h), m) => format!("{h} {m} min"),
    }
}

/// Clock-face start time in the local zone, e.g. `09:35`.
pub fn format_clock_face(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown() {
        assert_eq!(format_countdown(25 * 60), "25:00");
        assert_eq!(format_countdown(61), "01:01");
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(50 * 60 + 9), "50:09");
    }

    #[test]
    fn totals() {
        assert_eq!(format_total(25), "25 min");
        assert_eq!(format_total(60), "1 hr");
        assert_eq!(format_total(85), "1 hr 25 min");
        assert_eq!(format_total(180), "3 hrs");
        assert_eq!(format_total(295), "4 hrs 55 min");
    }
}
