//! Day and week views over the task list.
//!
//! Weeks run Sunday through Saturday.

use chrono::{Datelike, Duration, NaiveDate};

use super::Task;

/// Tasks scheduled on `date`, keeping their stored order.
pub fn tasks_for(tasks: impl IntoIterator<Item = Task>, date: NaiveDate) -> Vec<Task> {
    tasks.into_iter().filter(|t| t.date == date).collect()
}

/// The seven days of the week containing `date`, starting on Sunday.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let back = i64::from(date.weekday().num_days_from_sunday());
    let sunday = date - Duration::days(back);
    std::array::from_fn(|i| sunday + Duration::days(i as i64))
}

/// The week `offset` weeks away from the one containing `today`.
/// Negative offsets go back in time.
pub fn week_offset(today: NaiveDate, offset: i64) -> [NaiveDate; 7] {
    week_of(today + Duration::weeks(offset))
}

/// Per-day counts for a week strip: `(date, total, finished)`, where
/// finished means completed or failed.
pub fn week_summary(tasks: &[Task], week: &[NaiveDate; 7]) -> Vec<(NaiveDate, usize, usize)> {
    week.iter()
        .map(|day| {
            let on_day = tasks.iter().filter(|t| t.date == *day);
            let (total, finished) = on_day.fold((0, 0), |(n, done), t| {
                (n + 1, done + usize::from(t.completed || t.failed))
            });
            (*day, total, finished)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use chrono::{Utc, Weekday};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(id: &str, day: &str, completed: bool) -> Task {
        Task {
            id: id.into(),
            name: id.into(),
            kind: TaskKind::Task,
            date: d(day),
            reminder: None,
            note: None,
            completed,
            failed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-01 is a Wednesday.
        let week = week_of(d("2024-05-01"));
        assert_eq!(week[0], d("2024-04-28"));
        assert_eq!(week[0].weekday(), Weekday::Sun);
        assert_eq!(week[6], d("2024-05-04"));
        assert_eq!(week[6].weekday(), Weekday::Sat);
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let sunday = d("2024-04-28");
        assert_eq!(week_of(sunday)[0], sunday);
        assert_eq!(week_of(d("2024-05-04"))[0], sunday);
    }

    #[test]
    fn offsets_move_whole_weeks() {
        let today = d("2024-05-01");
        assert_eq!(week_offset(today, 0), week_of(today));
        assert_eq!(week_offset(today, 1)[0], d("2024-05-05"));
        assert_eq!(week_offset(today, -1)[0], d("2024-04-21"));
    }

    #[test]
    fn week_crosses_year_boundary() {
        let week = week_of(d("2025-01-01"));
        assert_eq!(week[0], d("2024-12-29"));
        assert_eq!(week[6], d("2025-01-04"));
    }

    #[test]
    fn filters_by_date() {
        let tasks = vec![
            task("a", "2024-05-01", false),
            task("b", "2024-05-02", false),
            task("c", "2024-05-01", true),
        ];
        let ids: Vec<_> = tasks_for(tasks, d("2024-05-01"))
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn summary_counts_finished() {
        let tasks = vec![
            task("a", "2024-05-01", false),
            task("b", "2024-05-01", true),
            task("c", "2024-05-03", false),
        ];
        let summary = week_summary(&tasks, &week_of(d("2024-05-01")));
        assert_eq!(summary.len(), 7);
        assert_eq!(summary[3], (d("2024-05-01"), 2, 1));
        assert_eq!(summary[5], (d("2024-05-03"), 1, 0));
        assert_eq!(summary[0].1, 0);
    }
}
