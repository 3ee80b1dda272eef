//! # Pomoplan Core Library
//!
//! Plans a run of Pomodoro work/break intervals from a total time budget and
//! counts them down against the wall clock.
//!
//! ## Architecture
//!
//! - **Session Planner**: a pure function from a format and a total number of
//!   minutes to an ordered, contiguous list of intervals
//! - **Countdown Engine**: a wall-clock-anchored state machine that requires
//!   the caller to periodically invoke `tick()`; pausing, resuming and late
//!   ticks never make it drift
//! - **Storage**: TOML-based configuration for the CLI host
//!
//! ## Key Components
//!
//! - [`Plan`]: Session planner output
//! - [`CountdownEngine`]: Core timer state machine
//! - [`Clock`]: Wall-clock source the engine reads
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use timer::{CountdownEngine, Interval, Plan, PomodoroFormat};
