//! Task management commands for CLI.

use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use focusday_core::notify::{schedule_reminder, LogScheduler, ReminderOutcome};
use focusday_core::{Mark, NewTask, Task, TaskKind, TaskPatch};
use tracing::debug;

use super::{open_tasks, parse_date, parse_time, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task name
        name: String,
        /// task, habit or recurring
        #[arg(long = "type", default_value = "task")]
        kind: TaskKind,
        /// Day: today, tomorrow or YYYY-MM-DD
        #[arg(long, default_value = "today", value_parser = parse_date)]
        date: NaiveDate,
        /// Reminder time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        reminder: Option<chrono::NaiveTime>,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },
    /// List tasks
    List {
        /// Only tasks on this day
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Print JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },
    /// Show task details
    Show {
        /// Task ID
        id: String,
    },
    /// Edit a task
    Edit {
        /// Task ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New type
        #[arg(long = "type")]
        kind: Option<TaskKind>,
        /// New note
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        /// Remove the note
        #[arg(long)]
        clear_note: bool,
        /// New reminder time (HH:MM)
        #[arg(long, value_parser = parse_time, conflicts_with = "clear_reminder")]
        reminder: Option<chrono::NaiveTime>,
        /// Remove the reminder
        #[arg(long)]
        clear_reminder: bool,
    },
    /// Move a task to another day
    Reschedule {
        /// Task ID
        id: String,
        /// Day: today, tomorrow or YYYY-MM-DD
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Toggle the completed flag
    Complete {
        /// Task ID
        id: String,
    },
    /// Toggle the failed flag
    Fail {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CliResult {
    let tasks = open_tasks()?;

    match action {
        TaskAction::Add {
            name,
            kind,
            date,
            reminder,
            note,
        } => {
            let task = tasks.create(NewTask {
                name,
                kind,
                date,
                reminder,
                note,
            })?;
            plan_reminder(&task)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { date, json } => {
            let list = match date {
                Some(date) => tasks.tasks_for(date)?,
                None => tasks.list()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for task in &list {
                    println!("{}", task_line(task));
                }
            }
        }
        TaskAction::Show { id } => {
            let task = tasks.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Edit {
            id,
            name,
            kind,
            note,
            clear_note,
            reminder,
            clear_reminder,
        } => {
            let patch = TaskPatch {
                name,
                kind,
                note: if clear_note { Some(None) } else { note.map(Some) },
                reminder: if clear_reminder {
                    Some(None)
                } else {
                    reminder.map(Some)
                },
            };
            let replan = patch.reminder.is_some();
            let task = tasks.edit(&id, patch)?;
            if replan {
                plan_reminder(&task)?;
            }
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Reschedule { id, date } => {
            let task = tasks.reschedule(&id, date)?;
            plan_reminder(&task)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Delete { id } => {
            tasks.delete(&id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Complete { id } => {
            let task = tasks.mark(&id, Mark::Complete)?;
            println!("{}", task_line(&task));
        }
        TaskAction::Fail { id } => {
            let task = tasks.mark(&id, Mark::Fail)?;
            println!("{}", task_line(&task));
        }
    }
    Ok(())
}

/// One plain line per task: status, id, date, reminder, type, name.
pub fn task_line(task: &Task) -> String {
    let status = if task.completed {
        "[x]"
    } else if task.failed {
        "[-]"
    } else {
        "[ ]"
    };
    let reminder = task
        .reminder
        .map(|r| r.time.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".into());
    format!(
        "{status} {} {} {reminder} {:<14} {}",
        task.id, task.date, task.kind, task.name
    )
}

fn plan_reminder(task: &Task) -> CliResult {
    match schedule_reminder(task, &LogScheduler, Utc::now(), &Local)? {
        ReminderOutcome::Scheduled { at, .. } => {
            eprintln!("reminder set for {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
        }
        ReminderOutcome::PermissionDenied => eprintln!("notifications not permitted"),
        ReminderOutcome::Skipped(reason) => debug!(?reason, "no reminder scheduled"),
    }
    Ok(())
}
