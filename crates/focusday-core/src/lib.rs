//! # Focusday Core Library
//!
//! Core logic for the Focusday interval timer and daily task list. The
//! `focusday` CLI is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a mode register ([`TimerEngine`]) advanced one second at a
//!   time, driven by a tokio ticker owned by [`TimerController`]
//! - **Transitions**: the Work / short break / long break cycle in
//!   [`next_mode`]
//! - **Storage**: TOML configuration and a SQLite key-value store
//! - **Tasks**: tasks and habits per day, with an agenda view and reminders
//!
//! ## Key Components
//!
//! - [`TimerController`]: start/stop/reset with a single live ticker
//! - [`DurationConfig`]: per-mode countdown lengths
//! - [`TaskList`]: task persistence over any [`KeyValueStore`]
//! - [`Config`]: application configuration management
//! - [`CueService`]: sound and haptic feedback at transitions

pub mod cue;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod task;
pub mod timer;

pub use cue::{CueService, SilentCue, TerminalBell};
pub use error::{ConfigError, CoreError, CueError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{
    schedule_reminder, LogScheduler, NotificationScheduler, Permission, ReminderOutcome,
};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use task::{Mark, NewTask, Task, TaskKind, TaskList, TaskPatch};
pub use timer::{
    next_mode, DriverOptions, DurationConfig, TimerController, TimerEngine, TimerMode,
    TimerSettings, TimerState,
};
