use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{DurationConfig, TimerMode};

/// Every state change of the timer produces an Event.
/// The CLI prints them; the driver broadcasts them to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        cycle_count: u32,
        at: DateTime<Utc>,
    },
    /// User picked a different mode tab.
    ModeSelected {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached its last second and the next mode took over.
    ModeCompleted {
        from: TimerMode,
        to: TimerMode,
        cycle_count: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StopwatchTicked {
        stopwatch_secs: u64,
        at: DateTime<Utc>,
    },
    DurationsUpdated {
        durations: DurationConfig,
        /// Whether the visible countdown was replaced by the new duration.
        applied_to_current: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        remaining_secs: u64,
        stopwatch_secs: u64,
        is_running: bool,
        cycle_count: u32,
        /// `MM:SS` rendering of whichever counter is active.
        display: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerStopped { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ModeSelected { at, .. }
            | Event::ModeCompleted { at, .. }
            | Event::StopwatchTicked { at, .. }
            | Event::DurationsUpdated { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
