//! Desktop notifications for timer completion.

use notify_rust::Notification;
use std::thread;
use tracing::warn;

use crate::timer::CompletionEvent;

/// Builds the summary and body shown for a completion.
pub fn notification_text(event: CompletionEvent) -> (&'static str, String) {
    match event {
        CompletionEvent::FocusComplete { completed_today } => {
            let body = if completed_today == 1 {
                "Great work! You've completed 1 pomodoro today.\nTime for a break.".to_string()
            } else {
                format!(
                    "Great work! You've completed {} pomodoros today.\nTime for a break.",
                    completed_today
                )
            };
            ("Focus Complete! 🍅", body)
        }
        CompletionEvent::BreakComplete { next_cycle } => (
            "Break Over! ☕",
            format!("Ready for pomodoro #{next_cycle}?"),
        ),
    }
}

/// Shows a notification for a completed focus session or break.
/// Runs in a background thread to avoid blocking the UI.
pub fn notify_completion(event: CompletionEvent) {
    thread::spawn(move || {
        let (summary, body) = notification_text(event);
        if let Err(e) = Notification::new()
            .summary(summary)
            .body(&body)
            .show()
        {
            warn!(error = %e, "failed to show notification");
        }
    });
}
