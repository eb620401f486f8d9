mod driver;
mod durations;
mod engine;
mod mode;

pub use driver::{DriverOptions, TimerController};
pub use durations::{
    clamp_minutes, default_minutes, parse_minutes, DurationConfig, MAX_MINUTES, MIN_MINUTES,
};
pub use engine::{format_mm_ss, TimerEngine, TimerSettings, TimerState};
pub use mode::{next_mode, TimerMode, DEFAULT_CYCLES_BEFORE_LONG_BREAK};
