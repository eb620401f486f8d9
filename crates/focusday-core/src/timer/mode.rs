use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of Work intervals before a long break, unless configured otherwise.
pub const DEFAULT_CYCLES_BEFORE_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
    Stopwatch,
}

impl TimerMode {
    pub const ALL: [TimerMode; 4] = [
        TimerMode::Work,
        TimerMode::ShortBreak,
        TimerMode::LongBreak,
        TimerMode::Stopwatch,
    ];

    /// Countdown modes have a configured duration; the stopwatch counts up.
    pub fn is_countdown(self) -> bool {
        !matches!(self, TimerMode::Stopwatch)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Work => "Pomodoro",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
            TimerMode::Stopwatch => "Stopwatch",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::ShortBreak => "short-break",
            TimerMode::LongBreak => "long-break",
            TimerMode::Stopwatch => "stopwatch",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" | "pomodoro" => Ok(TimerMode::Work),
            "short-break" | "short_break" | "short" => Ok(TimerMode::ShortBreak),
            "long-break" | "long_break" | "long" => Ok(TimerMode::LongBreak),
            "stopwatch" => Ok(TimerMode::Stopwatch),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown timer mode '{other}'"),
            }),
        }
    }
}

/// Mode that follows `current` once its countdown completes.
///
/// Completing Work compares the cycle count against
/// `cycles_before_long_break` first: on a match the long break starts and
/// the count goes back to 1, otherwise a short break starts with the count
/// unchanged. Completing a short break starts the next Work interval and
/// increments the count. Completing a long break starts Work with the count
/// it already had. The stopwatch never completes and maps to itself.
pub fn next_mode(
    current: TimerMode,
    cycle_count: u32,
    cycles_before_long_break: u32,
) -> (TimerMode, u32) {
    match current {
        TimerMode::Work if cycle_count == cycles_before_long_break => (TimerMode::LongBreak, 1),
        TimerMode::Work => (TimerMode::ShortBreak, cycle_count),
        TimerMode::ShortBreak => (TimerMode::Work, cycle_count.saturating_add(1)),
        TimerMode::LongBreak => (TimerMode::Work, cycle_count),
        TimerMode::Stopwatch => (TimerMode::Stopwatch, cycle_count),
    }
}
