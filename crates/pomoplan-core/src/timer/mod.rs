mod display;
mod engine;
mod plan;

pub use display::{format_clock_face, format_countdown, format_total};
pub use engine::{
    CountdownEngine, IDLE_SECONDS, MSG_COMPLETE, MSG_PAUSED, MSG_RESUMED, MSG_SETUP_FIRST,
    MSG_STARTED,
};
pub use plan::{restamp, truncate_to_minute, Interval, Plan, PomodoroFormat, OPTION_COUNT};
