pub mod config;
pub mod task;
pub mod timer;
pub mod today;

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use focusday_core::storage::Database;
use focusday_core::TaskList;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Task list in the default data directory.
pub fn open_tasks() -> Result<TaskList<Database>, Box<dyn std::error::Error>> {
    Ok(TaskList::new(Database::open()?))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `today`, `tomorrow`, `yesterday` or `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today()),
        "tomorrow" => Ok(today() + Duration::days(1)),
        "yesterday" => Ok(today() - Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| format!("invalid date '{input}', expected YYYY-MM-DD")),
    }
}

/// Accepts `HH:MM`.
pub fn parse_time(input: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| format!("invalid time '{input}', expected HH:MM"))
}
