//! Task reminders.
//!
//! A task with a reminder time gets one notification at that time on its
//! scheduled day. Delivery is behind [`NotificationScheduler`] so the CLI,
//! a desktop shell, or a test fake can each provide their own.

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::task::Task;

/// Answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Delivers notifications at a given instant.
pub trait NotificationScheduler {
    fn request_permission(&self) -> Permission;

    /// Schedule a notification and return its id.
    fn schedule_at(&self, at: DateTime<Utc>, title: &str, body: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoReminder,
    /// The reminder instant is not after `now`.
    InPast,
    /// The local wall-clock time does not exist (DST gap).
    NoSuchLocalTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderOutcome {
    Skipped(SkipReason),
    PermissionDenied,
    Scheduled { id: String, at: DateTime<Utc> },
}

/// The task's date at its reminder time in `tz`.
///
/// `None` when the task has no reminder or the local time does not exist.
/// Ambiguous local times resolve to the earlier instant.
pub fn reminder_instant<Tz: TimeZone>(task: &Task, tz: &Tz) -> Option<DateTime<Tz>> {
    let reminder = task.reminder?;
    tz.from_local_datetime(&task.date.and_time(reminder.time))
        .earliest()
}

/// Schedule the reminder for `task` if it has one in the future.
///
/// Permission is only requested once there is something to schedule.
pub fn schedule_reminder<Tz: TimeZone>(
    task: &Task,
    scheduler: &dyn NotificationScheduler,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<ReminderOutcome> {
    if task.reminder.is_none() {
        return Ok(ReminderOutcome::Skipped(SkipReason::NoReminder));
    }
    let Some(local) = reminder_instant(task, tz) else {
        return Ok(ReminderOutcome::Skipped(SkipReason::NoSuchLocalTime));
    };
    let at = local.with_timezone(&Utc);
    if at <= now {
        debug!(id = %task.id, %at, "reminder in the past, skipping");
        return Ok(ReminderOutcome::Skipped(SkipReason::InPast));
    }

    if scheduler.request_permission() == Permission::Denied {
        return Ok(ReminderOutcome::PermissionDenied);
    }

    let body = format!("{}: {}", task.kind, task.name);
    let id = scheduler.schedule_at(at, "Reminder", &body)?;
    info!(task = %task.id, notification = %id, %at, "reminder scheduled");
    Ok(ReminderOutcome::Scheduled { id, at })
}

/// Scheduler that only records reminders in the log.
#[derive(Debug, Default)]
pub struct LogScheduler;

impl NotificationScheduler for LogScheduler {
    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn schedule_at(&self, at: DateTime<Utc>, title: &str, body: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        info!(%id, %at, title, body, "notification");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Reminder, TaskKind};
    use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime};
    use std::sync::Mutex;

    /// Central European rules for 2024 only: UTC+1, UTC+2 from 31 March
    /// 01:00 UTC until 27 October 01:00 UTC.
    #[derive(Debug, Clone, Copy)]
    struct Cet2024;

    impl Cet2024 {
        fn local(date: (i32, u32, u32), h: u32) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        }

        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3600).unwrap()
        }

        fn summer() -> FixedOffset {
            FixedOffset::east_opt(2 * 3600).unwrap()
        }
    }

    impl TimeZone for Cet2024 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Cet2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap = Self::local((2024, 3, 31), 2)..Self::local((2024, 3, 31), 3);
            let overlap = Self::local((2024, 10, 27), 2)..Self::local((2024, 10, 27), 3);
            if gap.contains(local) {
                LocalResult::None
            } else if overlap.contains(local) {
                LocalResult::Ambiguous(Self::summer(), Self::winter())
            } else if *local >= gap.end && *local < overlap.start {
                LocalResult::Single(Self::summer())
            } else {
                LocalResult::Single(Self::winter())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let summer = Self::local((2024, 3, 31), 1)..Self::local((2024, 10, 27), 1);
            if summer.contains(utc) {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    struct FakeScheduler {
        permission: Permission,
        scheduled: Mutex<Vec<(DateTime<Utc>, String)>>,
    }

    impl FakeScheduler {
        fn new(permission: Permission) -> Self {
            Self {
                permission,
                scheduled: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationScheduler for FakeScheduler {
        fn request_permission(&self) -> Permission {
            self.permission
        }

        fn schedule_at(&self, at: DateTime<Utc>, _title: &str, body: &str) -> Result<String> {
            let mut scheduled = self.scheduled.lock().unwrap();
            scheduled.push((at, body.to_string()));
            Ok(format!("n{}", scheduled.len()))
        }
    }

    fn task(reminder: Option<(u32, u32)>) -> Task {
        Task {
            id: "t1".into(),
            name: "Water plants".into(),
            kind: TaskKind::Habit,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            reminder: reminder.map(|(h, m)| Reminder {
                time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            }),
            note: None,
            completed: false,
            failed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task_on(date: (i32, u32, u32), reminder: (u32, u32)) -> Task {
        Task {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            ..task(Some(reminder))
        }
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn instant_uses_local_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = reminder_instant(&task(Some((9, 30))), &tz).unwrap();
        assert_eq!(at.with_timezone(&Utc), utc("2024-05-01T07:30:00Z"));
        assert!(reminder_instant(&task(None), &tz).is_none());
    }

    #[test]
    fn reminder_in_spring_forward_gap_is_skipped() {
        let task = task_on((2024, 3, 31), (2, 30));
        assert!(reminder_instant(&task, &Cet2024).is_none());

        let scheduler = FakeScheduler::new(Permission::Granted);
        let outcome =
            schedule_reminder(&task, &scheduler, utc("2024-03-30T12:00:00Z"), &Cet2024).unwrap();
        assert_eq!(outcome, ReminderOutcome::Skipped(SkipReason::NoSuchLocalTime));
        assert!(scheduler.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn reminder_in_fall_back_overlap_uses_earlier_instant() {
        let task = task_on((2024, 10, 27), (2, 30));
        let at = reminder_instant(&task, &Cet2024).unwrap();
        assert_eq!(at.with_timezone(&Utc), utc("2024-10-27T00:30:00Z"));

        let scheduler = FakeScheduler::new(Permission::Granted);
        let outcome =
            schedule_reminder(&task, &scheduler, utc("2024-10-26T12:00:00Z"), &Cet2024).unwrap();
        assert_eq!(
            outcome,
            ReminderOutcome::Scheduled {
                id: "n1".into(),
                at: utc("2024-10-27T00:30:00Z"),
            }
        );
    }

    #[test]
    fn reminder_outside_transitions_uses_season_offset() {
        let summer = reminder_instant(&task_on((2024, 7, 1), (9, 0)), &Cet2024).unwrap();
        assert_eq!(summer.with_timezone(&Utc), utc("2024-07-01T07:00:00Z"));
        let winter = reminder_instant(&task_on((2024, 12, 1), (9, 0)), &Cet2024).unwrap();
        assert_eq!(winter.with_timezone(&Utc), utc("2024-12-01T08:00:00Z"));
    }

    #[test]
    fn schedules_future_reminder() {
        let scheduler = FakeScheduler::new(Permission::Granted);
        let outcome =
            schedule_reminder(&task(Some((9, 0))), &scheduler, utc("2024-05-01T08:00:00Z"), &Utc)
                .unwrap();
        assert_eq!(
            outcome,
            ReminderOutcome::Scheduled {
                id: "n1".into(),
                at: utc("2024-05-01T09:00:00Z"),
            }
        );
        let scheduled = scheduler.scheduled.lock().unwrap();
        assert_eq!(scheduled[0].1, "Habit: Water plants");
    }

    #[test]
    fn past_and_missing_reminders_are_skipped() {
        let scheduler = FakeScheduler::new(Permission::Granted);
        let now = utc("2024-05-01T09:00:00Z");
        assert_eq!(
            schedule_reminder(&task(Some((9, 0))), &scheduler, now, &Utc).unwrap(),
            ReminderOutcome::Skipped(SkipReason::InPast)
        );
        assert_eq!(
            schedule_reminder(&task(None), &scheduler, now, &Utc).unwrap(),
            ReminderOutcome::Skipped(SkipReason::NoReminder)
        );
        assert!(scheduler.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn denied_permission_never_schedules() {
        let scheduler = FakeScheduler::new(Permission::Denied);
        let outcome =
            schedule_reminder(&task(Some((18, 0))), &scheduler, utc("2024-05-01T08:00:00Z"), &Utc)
                .unwrap();
        assert_eq!(outcome, ReminderOutcome::PermissionDenied);
        assert!(scheduler.scheduled.lock().unwrap().is_empty());
    }

    #[test]
    fn log_scheduler_returns_ids() {
        let a = LogScheduler.schedule_at(Utc::now(), "Reminder", "x").unwrap();
        let b = LogScheduler.schedule_at(Utc::now(), "Reminder", "x").unwrap();
        assert_ne!(a, b);
        assert_eq!(LogScheduler.request_permission(), Permission::Granted);
    }
}
