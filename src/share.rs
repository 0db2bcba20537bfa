//! Plain-text summary of the day for pasting into chats.

use chrono::NaiveDate;

use crate::tasks::Task;
use crate::timer::format_duration;

/// Builds the shareable "plan & results" text for `date`.
///
/// Only tasks created on `date` are listed.
pub fn share_text(
    date: NaiveDate,
    tasks: &[Task],
    focused_secs: u64,
    completed_sessions: u32,
) -> String {
    let mut lines = vec![
        date.format("%d/%m/%Y").to_string(),
        String::new(),
        "🎯 Plan & Results".to_string(),
        String::new(),
    ];

    for task in tasks.iter().filter(|t| t.created_at == date) {
        let status = if task.is_done() { "✅" } else { "❌" };
        if task.completed_pomodoros > 0 {
            lines.push(format!(
                "- {} | Pomodoro: {} {}",
                task.name, task.completed_pomodoros, status
            ));
        } else {
            lines.push(format!("- {} {}", task.name, status));
        }
    }

    lines.push(String::new());
    lines.push(format!("🍅 Total Pomodoro: {completed_sessions}"));
    lines.push(format!(
        "📈 Total Time Focused: {}",
        format_duration(focused_secs)
    ));
    lines.push(String::new());
    lines.push("⚡️ Keep Learning!".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_share_text_without_tasks() {
        let text = share_text(day(5), &[], 0, 0);
        assert_eq!(
            text,
            "05/03/2024\n\n🎯 Plan & Results\n\n\n🍅 Total Pomodoro: 0\n📈 Total Time Focused: 0m\n\n⚡️ Keep Learning!"
        );
    }

    #[test]
    fn test_share_text_lists_todays_tasks() {
        let mut finished = Task::new("Write report", 2, day(5));
        finished.completed_pomodoros = 2;
        let mut partial = Task::new("Read paper", 3, day(5));
        partial.completed_pomodoros = 1;
        let untouched = Task::new("Email", 1, day(5));
        let mut ticked = Task::new("Call back", 1, day(5));
        ticked.is_completed = true;
        let old = Task::new("Yesterday's thing", 1, day(4));

        let text = share_text(
            day(5),
            &[finished, partial, untouched, ticked, old],
            2 * 3600 + 5 * 60,
            4,
        );

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "05/03/2024");
        assert_eq!(lines[4], "- Write report | Pomodoro: 2 ✅");
        assert_eq!(lines[5], "- Read paper | Pomodoro: 1 ❌");
        assert_eq!(lines[6], "- Email ❌");
        assert_eq!(lines[7], "- Call back ✅");
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "🍅 Total Pomodoro: 4");
        assert_eq!(lines[10], "📈 Total Time Focused: 2h 5m");
        assert_eq!(lines[12], "⚡️ Keep Learning!");
        assert!(!text.contains("Yesterday"));
    }
}
