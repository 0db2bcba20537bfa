//! Data models for the pomodesk application.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of a pomodoro cycle the timer is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Focused work.
    #[default]
    Focus,
    /// Rest between focus sessions.
    Break,
}

impl TimerMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Break => "Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed durations for a timer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Length of a focus session in seconds.
    pub focus_secs: u32,
    /// Length of a break in seconds.
    pub break_secs: u32,
    /// Number of focus/break cycles before the cycle counter wraps.
    pub cycles_per_set: u32,
}

impl TimerConfig {
    pub const DEFAULT: Self = Self {
        focus_secs: 25 * 60,
        break_secs: 5 * 60,
        cycles_per_set: 4,
    };

    /// Returns the full duration of the given mode in seconds.
    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_secs,
            TimerMode::Break => self.break_secs,
        }
    }

    /// Returns the cycle that follows `cycle`, wrapping after the last one in a set.
    pub fn next_cycle(&self, cycle: u32) -> u32 {
        if cycle >= self.cycles_per_set {
            1
        } else {
            cycle + 1
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Snapshot of the timer state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub time_remaining_secs: u32,
    pub is_running: bool,
    /// Pomodoro index within the current set, starting at 1.
    pub current_cycle: u32,
    pub today_focused_secs: u64,
    pub today_completed_sessions: u32,
}

impl TimerState {
    /// Creates the initial state: focus mode, full duration, paused, first cycle.
    pub fn initial(config: &TimerConfig, today: DailyStatsRecord) -> Self {
        Self {
            mode: TimerMode::Focus,
            time_remaining_secs: config.focus_secs,
            is_running: false,
            current_cycle: 1,
            today_focused_secs: today.focused_seconds,
            today_completed_sessions: today.completed_sessions,
        }
    }

    pub fn is_focus(&self) -> bool {
        self.mode == TimerMode::Focus
    }

    pub fn is_break(&self) -> bool {
        self.mode == TimerMode::Break
    }

    /// Today's statistics as a persistable record.
    pub fn today_stats(&self) -> DailyStatsRecord {
        DailyStatsRecord {
            focused_seconds: self.today_focused_secs,
            completed_sessions: self.today_completed_sessions,
        }
    }
}

/// Per-day focus statistics, persisted under the calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatsRecord {
    pub focused_seconds: u64,
    pub completed_sessions: u32,
}

/// User-configurable settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Whether to show desktop notifications when a session or break ends.
    pub notifications_enabled: bool,
    /// Pomodoros per day used for the end-of-year projection.
    pub daily_pomodoros: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            daily_pomodoros: crate::year::DEFAULT_DAILY_POMODOROS,
        }
    }
}
