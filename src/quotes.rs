//! Short quotes shown under the timer.

use crate::models::TimerMode;

const FOCUS_QUOTES: &[&str] = &[
    "Small changes, big goals.",
    "Every action you take is a vote for the type of person you wish to become.",
    "You do not rise to the level of your goals. You fall to the level of your systems.",
    "Habits are the compound interest of self-improvement.",
    "Time magnifies the margin between success and failure.",
];

const BREAK_QUOTES: &[&str] = &[
    "Rest. Reset. Refocus.",
    "Take a moment to breathe.",
    "Small breaks lead to big breakthroughs.",
    "Pause and reflect on your progress.",
];

/// Picks a quote for `mode`; the same seed always gives the same quote.
pub fn quote_for(mode: TimerMode, seed: u64) -> &'static str {
    let quotes = match mode {
        TimerMode::Focus => FOCUS_QUOTES,
        TimerMode::Break => BREAK_QUOTES,
    };
    // Both lists are non-empty constants.
    quotes[(seed % quotes.len() as u64) as usize]
}
