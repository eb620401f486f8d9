//! Per-mode countdown durations and the rules for editing them.
//!
//! Durations are held in seconds. User input arrives in minutes and is
//! never rejected: out-of-range values are clamped to
//! [`MIN_MINUTES`]..=[`MAX_MINUTES`] and unparseable text falls back to the
//! mode's default.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::mode::TimerMode;
use crate::error::ValidationError;

pub const MIN_MINUTES: u64 = 1;
pub const MAX_MINUTES: u64 = 180;

pub const DEFAULT_WORK_MINUTES: u64 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;

/// Target duration, in seconds, of each countdown mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    work: u64,
    short_break: u64,
    long_break: u64,
}

impl DurationConfig {
    /// Build from seconds. Every duration must be positive.
    pub fn new(work: u64, short_break: u64, long_break: u64) -> Result<Self, ValidationError> {
        for (field, secs) in [
            ("work", work),
            ("short_break", short_break),
            ("long_break", long_break),
        ] {
            if secs == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "duration must be greater than zero".into(),
                });
            }
        }
        Ok(Self {
            work,
            short_break,
            long_break,
        })
    }

    /// Build from minutes, clamping each value into the allowed range.
    pub fn from_minutes(work: u64, short_break: u64, long_break: u64) -> Self {
        Self {
            work: clamp_minutes(work) * 60,
            short_break: clamp_minutes(short_break) * 60,
            long_break: clamp_minutes(long_break) * 60,
        }
    }

    pub fn work(&self) -> u64 {
        self.work
    }

    pub fn short_break(&self) -> u64 {
        self.short_break
    }

    pub fn long_break(&self) -> u64 {
        self.long_break
    }

    /// Duration of `mode` in seconds, `None` for the stopwatch.
    pub fn for_mode(&self, mode: TimerMode) -> Option<u64> {
        match mode {
            TimerMode::Work => Some(self.work),
            TimerMode::ShortBreak => Some(self.short_break),
            TimerMode::LongBreak => Some(self.long_break),
            TimerMode::Stopwatch => None,
        }
    }

    /// Copy with `mode` set to `minutes`, clamped. The stopwatch has no
    /// duration, so editing it returns the config unchanged.
    pub fn with_minutes(mut self, mode: TimerMode, minutes: u64) -> Self {
        let secs = clamp_minutes(minutes) * 60;
        match mode {
            TimerMode::Work => self.work = secs,
            TimerMode::ShortBreak => self.short_break = secs,
            TimerMode::LongBreak => self.long_break = secs,
            TimerMode::Stopwatch => {}
        }
        self
    }

    /// Copy with `mode` set from raw user input; see [`parse_minutes`].
    pub fn with_input(self, mode: TimerMode, input: &str) -> Self {
        self.with_minutes(mode, parse_minutes(mode, input))
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self::from_minutes(
            DEFAULT_WORK_MINUTES,
            DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_LONG_BREAK_MINUTES,
        )
    }
}

pub fn default_minutes(mode: TimerMode) -> u64 {
    match mode {
        TimerMode::Work | TimerMode::Stopwatch => DEFAULT_WORK_MINUTES,
        TimerMode::ShortBreak => DEFAULT_SHORT_BREAK_MINUTES,
        TimerMode::LongBreak => DEFAULT_LONG_BREAK_MINUTES,
    }
}

pub fn clamp_minutes(minutes: u64) -> u64 {
    minutes.clamp(MIN_MINUTES, MAX_MINUTES)
}

/// Interpret text typed into a duration field as minutes.
///
/// Numbers are clamped into range, an all-digit value too large to parse
/// becomes the maximum, and anything else yields the mode's default.
pub fn parse_minutes(mode: TimerMode, input: &str) -> u64 {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if n < MIN_MINUTES as i64 => {
            debug!(input = trimmed, %mode, "duration below minimum, clamping");
            MIN_MINUTES
        }
        Ok(n) => clamp_minutes(n as u64),
        Err(_) if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) => {
            debug!(input = trimmed, %mode, "duration overflow, clamping");
            MAX_MINUTES
        }
        Err(_) => {
            debug!(input = trimmed, %mode, "non-numeric duration, using default");
            default_minutes(mode)
        }
    }
}
