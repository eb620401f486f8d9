//! Timer engine implementation.
//!
//! The engine is the mode register plus the rules that mutate it. It has no
//! clock of its own: [`TimerEngine::tick`] means "one second elapsed" and is
//! called by the driver in [`super::driver`], or directly by tests.
//!
//! ## Mode cycle
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> Work (cycle N) -> LongBreak -> Work
//! Stopwatch: counts up, never transitions
//! ```
//!
//! A countdown transitions on the tick that finds one second remaining, so
//! the visible remaining time goes `..., 2, 1` and then shows the next
//! mode's full duration. It never shows `0`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::durations::DurationConfig;
use super::mode::{next_mode, TimerMode, DEFAULT_CYCLES_BEFORE_LONG_BREAK};
use crate::events::Event;

/// Snapshot of the mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_secs: u64,
    pub is_running: bool,
    pub cycle_count: u32,
    pub stopwatch_secs: u64,
}

impl TimerState {
    /// Seconds shown on the display: the stopwatch in stopwatch mode, the
    /// countdown otherwise.
    pub fn display_secs(&self) -> u64 {
        if self.mode.is_countdown() {
            self.remaining_secs
        } else {
            self.stopwatch_secs
        }
    }

    pub fn display(&self) -> String {
        format_mm_ss(self.display_secs())
    }
}

/// Behavior switches fixed for the lifetime of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    /// Work intervals before a long break.
    pub cycles_before_long_break: u32,
    /// Keep running into the next mode after a countdown completes.
    pub auto_advance: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            cycles_before_long_break: DEFAULT_CYCLES_BEFORE_LONG_BREAK,
            auto_advance: true,
        }
    }
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    state: TimerState,
    durations: DurationConfig,
    settings: TimerSettings,
}

impl TimerEngine {
    /// Create an engine in Work mode, stopped, on cycle 1.
    pub fn new(durations: DurationConfig, settings: TimerSettings) -> Self {
        let settings = TimerSettings {
            cycles_before_long_break: settings.cycles_before_long_break.max(1),
            ..settings
        };
        Self {
            state: TimerState {
                mode: TimerMode::Work,
                remaining_secs: durations.work(),
                is_running: false,
                cycle_count: 1,
                stopwatch_secs: 0,
            },
            durations,
            settings,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn stopwatch_secs(&self) -> u64 {
        self.state.stopwatch_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn cycle_count(&self) -> u32 {
        self.state.cycle_count
    }

    pub fn durations(&self) -> DurationConfig {
        self.durations
    }

    pub fn settings(&self) -> TimerSettings {
        self.settings
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            stopwatch_secs: self.state.stopwatch_secs,
            is_running: self.state.is_running,
            cycle_count: self.state.cycle_count,
            display: self.state.display(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running {
            return None;
        }
        self.state.is_running = true;
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        Some(Event::TimerStopped {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.is_running {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Manual reset: stop and refill the current mode's counter.
    ///
    /// Resetting in Work mode also starts the cycle count over.
    pub fn reset(&mut self) -> Event {
        self.state.is_running = false;
        self.refill();
        if self.state.mode == TimerMode::Work {
            self.state.cycle_count = 1;
        }
        Event::TimerReset {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            cycle_count: self.state.cycle_count,
            at: Utc::now(),
        }
    }

    /// Switch to `mode`, stopped, with a fresh counter. The cycle count is
    /// kept. Selecting the current mode does nothing.
    pub fn select_mode(&mut self, mode: TimerMode) -> Option<Event> {
        if mode == self.state.mode {
            return None;
        }
        self.state.mode = mode;
        self.state.is_running = false;
        self.refill();
        Some(Event::ModeSelected {
            mode,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Save edited durations.
    ///
    /// A running countdown is left alone. When stopped in a countdown mode
    /// the display refills with the saved duration, changed or not.
    pub fn apply_durations(&mut self, durations: DurationConfig) -> Event {
        self.durations = durations;

        let applied_to_current = !self.state.is_running && self.state.mode.is_countdown();
        if applied_to_current {
            self.refill();
        }
        Event::DurationsUpdated {
            durations,
            applied_to_current,
            at: Utc::now(),
        }
    }

    /// One second elapsed.
    ///
    /// Returns `Some(Event::ModeCompleted)` when a countdown finishes and
    /// `Some(Event::StopwatchTicked)` on every stopwatch tick. Does nothing
    /// while stopped.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        if !self.state.mode.is_countdown() {
            self.state.stopwatch_secs = self.state.stopwatch_secs.saturating_add(1);
            return Some(Event::StopwatchTicked {
                stopwatch_secs: self.state.stopwatch_secs,
                at: Utc::now(),
            });
        }
        if self.state.remaining_secs > 1 {
            self.state.remaining_secs -= 1;
            debug!(remaining = self.state.remaining_secs, "tick");
            return None;
        }
        Some(self.complete())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Event {
        let from = self.state.mode;
        let (to, cycle_count) = next_mode(
            from,
            self.state.cycle_count,
            self.settings.cycles_before_long_break,
        );
        self.state.mode = to;
        self.state.cycle_count = cycle_count;
        self.state.is_running = self.settings.auto_advance;
        self.refill();
        info!(%from, %to, cycle_count, "interval completed");
        Event::ModeCompleted {
            from,
            to,
            cycle_count,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        }
    }

    fn refill(&mut self) {
        match self.durations.for_mode(self.state.mode) {
            Some(secs) => self.state.remaining_secs = secs,
            None => self.state.stopwatch_secs = 0,
        }
    }
}

/// `MM:SS`, with minutes growing past two digits as needed.
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
