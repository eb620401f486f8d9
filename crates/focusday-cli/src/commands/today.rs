use chrono::NaiveDate;
use clap::Args;
use focusday_core::task::agenda::{tasks_for, week_offset, week_summary};

use super::task::task_line;
use super::{open_tasks, parse_date, today, CliResult};

#[derive(Args)]
pub struct TodayArgs {
    /// Show this day instead of today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Week strip offset from the selected day's week, e.g. -1 for last week
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    week: i64,
    /// Print JSON instead of plain lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: TodayArgs) -> CliResult {
    let list = open_tasks()?;
    let day = args.date.unwrap_or_else(today);
    let all = list.list()?;
    let week = week_offset(day, args.week);
    let summary = week_summary(&all, &week);
    let tasks = tasks_for(all, day);

    if args.json {
        let days: Vec<_> = summary
            .iter()
            .map(|(date, total, finished)| {
                serde_json::json!({ "date": date, "total": total, "finished": finished })
            })
            .collect();
        let out = serde_json::json!({ "date": day, "week": days, "tasks": tasks });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let strip: Vec<String> = summary
        .iter()
        .map(|(date, total, finished)| {
            let marker = if *date == day { "*" } else { " " };
            format!("{marker}{} {finished}/{total}", date.format("%a %d"))
        })
        .collect();
    println!("{}", strip.join("  "));
    println!("{}", day.format("%A, %B %-d, %Y"));
    if tasks.is_empty() {
        println!("No tasks.");
    }
    for task in &tasks {
        println!("{}", task_line(task));
    }
    Ok(())
}
