//! Single tasks and habits, stored as one serialized list.
//!
//! The whole list lives under [`TASKS_KEY`] of a [`KeyValueStore`]. Every
//! operation loads the list, changes it, and writes it back.

pub mod agenda;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, Result, StorageError, ValidationError};
use crate::storage::KeyValueStore;

/// Store key holding the JSON task list.
pub const TASKS_KEY: &str = "TASKS_LIST";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Task,
    Habit,
    #[serde(rename = "Recurring Task")]
    RecurringTask,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Task => "Task",
            TaskKind::Habit => "Habit",
            TaskKind::RecurringTask => "Recurring Task",
        };
        f.pad(name)
    }
}

impl FromStr for TaskKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(TaskKind::Task),
            "habit" => Ok(TaskKind::Habit),
            "recurring" | "recurring task" | "recurring-task" => Ok(TaskKind::RecurringTask),
            other => Err(ValidationError::InvalidValue {
                field: "type".into(),
                message: format!("unknown task type '{other}'"),
            }),
        }
    }
}

/// Time of day a reminder fires, stored as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub kind: TaskKind,
    pub date: NaiveDate,
    pub reminder: Option<NaiveTime>,
    pub note: Option<String>,
}

/// Partial edit. `None` leaves a field alone; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub kind: Option<TaskKind>,
    pub note: Option<Option<String>>,
    pub reminder: Option<Option<NaiveTime>>,
}

/// Outcome flag toggled from the agenda. Setting one clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Complete,
    Fail,
}

/// Task list persisted in a key-value store.
pub struct TaskList<S> {
    store: S,
}

impl<S: KeyValueStore> TaskList<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All tasks in stored order. A missing key is an empty list.
    pub fn list(&self) -> Result<Vec<Task>> {
        match self.store.get(TASKS_KEY)? {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                CoreError::Storage(StorageError::Corrupt {
                    key: TASKS_KEY.into(),
                    message: e.to_string(),
                })
            }),
        }
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        self.list()?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn create(&self, new: NewTask) -> Result<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: validate_name(&new.name)?,
            kind: new.kind,
            date: new.date,
            reminder: new.reminder.map(|time| Reminder { time }),
            note: new.note.filter(|n| !n.trim().is_empty()),
            completed: false,
            failed: false,
            created_at: now,
            updated_at: now,
        };
        let mut tasks = self.list()?;
        tasks.push(task.clone());
        self.save(&tasks)?;
        debug!(id = %task.id, date = %task.date, "task created");
        Ok(task)
    }

    pub fn edit(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let name = patch.name.as_deref().map(validate_name).transpose()?;
        self.update(id, |task| {
            if let Some(name) = name {
                task.name = name;
            }
            if let Some(kind) = patch.kind {
                task.kind = kind;
            }
            if let Some(note) = patch.note {
                task.note = note.filter(|n| !n.trim().is_empty());
            }
            if let Some(reminder) = patch.reminder {
                task.reminder = reminder.map(|time| Reminder { time });
            }
        })
    }

    /// Move a task to another day. Its outcome flags are kept.
    pub fn reschedule(&self, id: &str, date: NaiveDate) -> Result<Task> {
        self.update(id, |task| task.date = date)
    }

    pub fn mark(&self, id: &str, mark: Mark) -> Result<Task> {
        self.update(id, |task| match mark {
            Mark::Complete => {
                task.completed = !task.completed;
                task.failed = false;
            }
            Mark::Fail => {
                task.failed = !task.failed;
                task.completed = false;
            }
        })
    }

    /// Remove a task and return it.
    pub fn delete(&self, id: &str) -> Result<Task> {
        let mut tasks = self.list()?;
        let pos = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        let task = tasks.remove(pos);
        self.save(&tasks)?;
        debug!(id, "task deleted");
        Ok(task)
    }

    /// Tasks scheduled on `date`, in stored order.
    pub fn tasks_for(&self, date: NaiveDate) -> Result<Vec<Task>> {
        Ok(agenda::tasks_for(self.list()?, date))
    }

    fn update<F>(&self, id: &str, f: F) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.list()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        f(task);
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.save(&tasks)?;
        Ok(updated)
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        self.store.set(TASKS_KEY, &json)
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty("name".into()).into());
    }
    Ok(trimmed.to_string())
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        kind: "task",
        id: id.to_string(),
    }
}

/// Serde helpers for `HH:MM` times. Seconds are accepted on input.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
