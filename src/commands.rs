//! One-shot commands run from the command line.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::app::{App, AppError};
use crate::cli::{ConfigArgs, NotesCommands, TaskCommands};
use crate::scheduler::Scheduler;
use crate::tasks::{TaskError, TaskUpdate};
use crate::timer::format_duration;
use crate::year::clamp_daily;

pub fn stats<K: Scheduler>(app: &App<K>, date: Option<NaiveDate>) -> Result<String, AppError> {
    let date = date.unwrap_or_else(|| app.today());
    let record = app.daily_stats(date)?;
    Ok(format!(
        "{date}\nFocused: {}\nCompleted sessions: {}",
        format_duration(record.focused_seconds),
        record.completed_sessions
    ))
}

pub fn share<K: Scheduler>(app: &App<K>) -> String {
    app.share_text()
}

pub fn year<K: Scheduler>(app: &App<K>, daily: Option<u32>) -> String {
    let progress = app.year_progress();
    let daily = clamp_daily(daily.unwrap_or(app.settings.daily_pomodoros));
    format!(
        "{:.2}% of the year has passed\n{} days {} hours {} minutes {} seconds left\n\
         At {daily} pomodoros a day you will finish about {}+ pomodoros by the end of the year.",
        progress.percentage,
        progress.days,
        progress.hours,
        progress.minutes,
        progress.seconds,
        progress.estimated_pomodoros(daily),
    )
}

pub fn task<K: Scheduler>(app: &mut App<K>, command: TaskCommands) -> Result<String, AppError> {
    match command {
        TaskCommands::Add { name, pomodoros } => {
            let id = app.add_task(&name, pomodoros)?;
            let task = app.tasks.get(id).ok_or(TaskError::NotFound(id))?;
            Ok(format!(
                "Added \"{}\" ({} planned)",
                task.name, task.planned_pomodoros
            ))
        }
        TaskCommands::List { all } => Ok(list_tasks(app, all)),
        TaskCommands::Done { index } => {
            let id = task_at(app, index)?;
            app.toggle_task(id)?;
            Ok(list_tasks(app, false))
        }
        TaskCommands::Edit {
            index,
            name,
            pomodoros,
        } => {
            let id = task_at(app, index)?;
            app.update_task(
                id,
                TaskUpdate {
                    name,
                    planned_pomodoros: pomodoros,
                    ..TaskUpdate::default()
                },
            )?;
            Ok(list_tasks(app, false))
        }
        TaskCommands::Remove { index } => {
            let id = task_at(app, index)?;
            app.delete_task(id)?;
            Ok(list_tasks(app, false))
        }
    }
}

pub fn notes<K: Scheduler>(app: &mut App<K>, command: NotesCommands) -> String {
    match command {
        NotesCommands::Show => {}
        NotesCommands::Set { text } => app.edit_notes(|n| n.update(text)),
        NotesCommands::Clear => app.edit_notes(|n| n.clear()),
    }
    app.notes.text().to_string()
}

pub fn config<K: Scheduler>(app: &mut App<K>, args: ConfigArgs) -> String {
    if let Some(enabled) = args.notifications {
        app.update_setting(|s| s.notifications_enabled = enabled);
    }
    if let Some(daily) = args.daily {
        app.update_setting(|s| s.daily_pomodoros = clamp_daily(daily));
    }
    format!(
        "notifications: {}\ndaily pomodoros: {}",
        if app.settings.notifications_enabled { "on" } else { "off" },
        app.settings.daily_pomodoros
    )
}

fn list_tasks<K: Scheduler>(app: &App<K>, all: bool) -> String {
    let today = app.today();
    let tasks: Vec<_> = if all {
        app.tasks.tasks().iter().collect()
    } else {
        app.tasks.today_tasks(today)
    };

    if tasks.is_empty() {
        return "No tasks yet".to_string();
    }

    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let mark = if task.is_completed { "x" } else { " " };
            let mut line = format!(
                "{:>2}. [{mark}] {} {}/{}",
                i + 1,
                task.name,
                task.completed_pomodoros,
                task.planned_pomodoros
            );
            if all && task.created_at != today {
                line.push_str(&format!("  ({})", task.created_at));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves a 1-based position in today's list.
fn task_at<K: Scheduler>(app: &App<K>, index: usize) -> Result<Uuid, AppError> {
    app.tasks
        .today_tasks(app.today())
        .get(index.wrapping_sub(1))
        .map(|t| t.id)
        .ok_or_else(|| TaskError::NoSuchPosition(index).into())
}
