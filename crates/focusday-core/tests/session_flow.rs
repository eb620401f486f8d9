//! End-to-end flows across config, timer driver and task storage.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use focusday_core::notify::{schedule_reminder, LogScheduler, ReminderOutcome};
use focusday_core::task::agenda::{week_of, week_summary};
use focusday_core::{
    Config, Database, DriverOptions, Event, Mark, NewTask, SilentCue, TaskKind, TaskList,
    TimerController, TimerMode,
};

fn write_config(dir: &tempfile::TempDir, body: &str) -> Config {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    Config::load_from(&path).unwrap()
}

#[tokio::test(start_paused = true)]
async fn configured_cycle_reaches_long_break() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        "[timer]\nwork_minutes = 1\nshort_break_minutes = 1\nlong_break_minutes = 2\n",
    );

    let options = DriverOptions::new(
        config.durations(),
        config.timer_settings(),
        Arc::new(SilentCue),
    );
    let mut timer = TimerController::new(options);
    let mut events = timer.subscribe();
    timer.start();

    // Four work intervals and three short breaks, one minute each.
    tokio::time::sleep(Duration::from_millis(7 * 60 * 1000 + 500)).await;

    let mut completions = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Event::ModeCompleted {
            to, cycle_count, ..
        } = event
        {
            completions.push((to, cycle_count));
        }
    }
    assert_eq!(
        completions,
        vec![
            (TimerMode::ShortBreak, 1),
            (TimerMode::Work, 2),
            (TimerMode::ShortBreak, 2),
            (TimerMode::Work, 3),
            (TimerMode::ShortBreak, 3),
            (TimerMode::Work, 4),
            (TimerMode::LongBreak, 1),
        ]
    );

    let state = timer.state();
    assert_eq!(state.mode, TimerMode::LongBreak);
    assert_eq!(state.remaining_secs, 120);
    assert!(state.is_running);
}

#[tokio::test(start_paused = true)]
async fn manual_advance_stops_after_transition() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[timer]\nwork_minutes = 1\nauto_advance = false\n");

    let mut timer = TimerController::new(DriverOptions::new(
        config.durations(),
        config.timer_settings(),
        Arc::new(SilentCue),
    ));
    timer.start();
    tokio::time::sleep(Duration::from_secs(90)).await;

    let state = timer.state();
    assert_eq!(state.mode, TimerMode::ShortBreak);
    assert_eq!(state.remaining_secs, 300);
    assert!(!state.is_running);
    assert!(!timer.has_ticker());
}

#[test]
fn day_of_tasks_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("focusday.db")).unwrap();
    let list = TaskList::new(db);
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let run = list
        .create(NewTask {
            name: "Morning run".into(),
            kind: TaskKind::Habit,
            date: day,
            reminder: NaiveTime::from_hms_opt(7, 0, 0),
            note: None,
        })
        .unwrap();
    list.create(NewTask {
        name: "Submit report".into(),
        kind: TaskKind::Task,
        date: day,
        reminder: None,
        note: Some("before noon".into()),
    })
    .unwrap();
    list.mark(&run.id, Mark::Complete).unwrap();

    let week = week_of(day);
    let summary = week_summary(&list.list().unwrap(), &week);
    assert_eq!(summary[3], (day, 2, 1));

    let before = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
    let outcome = schedule_reminder(&run, &LogScheduler, before, &Utc).unwrap();
    assert!(matches!(outcome, ReminderOutcome::Scheduled { .. }));

    let after = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let outcome = schedule_reminder(&run, &LogScheduler, after, &Utc).unwrap();
    assert!(matches!(outcome, ReminderOutcome::Skipped(_)));
}
