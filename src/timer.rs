//! The focus/break timer state machine.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, trace, warn};

use crate::clock::{date_key, Clock, ElapsedTracker};
use crate::models::{DailyStatsRecord, TimerConfig, TimerMode, TimerState};
use crate::persistence::StatsStore;
use crate::scheduler::{ScheduleHandle, Scheduler};

/// Nominal cadence of scheduled ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Emitted when a countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEvent {
    /// A focus session ran out; `completed_today` includes it.
    FocusComplete { completed_today: u32 },
    /// A break ran out; `next_cycle` is the cycle about to start.
    BreakComplete { next_cycle: u32 },
}

/// Owns the timer state and is its only mutator.
pub struct TimerEngine<S, K> {
    state: TimerState,
    config: TimerConfig,
    store: S,
    scheduler: K,
    clock: Arc<dyn Clock>,
    armed: Option<ScheduleHandle>,
    drift: ElapsedTracker,
    stats_date: NaiveDate,
}

impl<S: StatsStore, K: Scheduler> TimerEngine<S, K> {
    /// Creates an engine in its initial state with today's stats loaded from `store`.
    pub fn new(config: TimerConfig, store: S, scheduler: K, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let today = now.date_naive();
        let stats = load_stats(&store, today);

        Self {
            state: TimerState::initial(&config, stats),
            config,
            store,
            scheduler,
            clock,
            armed: None,
            drift: ElapsedTracker::new(now),
            stats_date: today,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// The schedule currently driving ticks, if running.
    pub fn armed_handle(&self) -> Option<ScheduleHandle> {
        self.armed
    }

    /// Full duration of the current mode in seconds.
    pub fn current_duration(&self) -> u32 {
        self.config.duration_for(self.state.mode)
    }

    /// Fraction of the current countdown already elapsed, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.current_duration();
        if total == 0 {
            return 1.0;
        }
        let fraction = 1.0 - f64::from(self.state.time_remaining_secs) / f64::from(total);
        fraction.clamp(0.0, 1.0)
    }

    pub fn start(&mut self) {
        if self.state.is_running {
            return;
        }
        self.state.is_running = true;
        self.drift.reset(self.clock.now());
        self.armed = Some(self.scheduler.arm_periodic(TICK_INTERVAL));
        debug!(mode = %self.state.mode, remaining = self.state.time_remaining_secs, "timer started");
    }

    pub fn pause(&mut self) {
        if self.state.is_running {
            debug!(remaining = self.state.time_remaining_secs, "timer paused");
        }
        self.state.is_running = false;
        self.disarm();
    }

    pub fn toggle(&mut self) {
        if self.state.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Handles a scheduler firing. Ticks from any handle other than the
    /// currently armed one are stale and ignored.
    pub fn on_scheduled_tick(
        &mut self,
        handle: ScheduleHandle,
    ) -> (bool, Option<CompletionEvent>) {
        if self.armed != Some(handle) {
            trace!(?handle, "ignoring stale tick");
            return (false, None);
        }
        let elapsed = self.drift.take_elapsed(self.clock.now());
        self.tick(elapsed)
    }

    /// Advances the countdown by `elapsed_secs` of wall-clock time.
    /// Returns (state_changed, optional_completion_event).
    pub fn tick(&mut self, elapsed_secs: i64) -> (bool, Option<CompletionEvent>) {
        if !self.state.is_running {
            return (false, None);
        }
        let elapsed = u64::try_from(elapsed_secs).unwrap_or(0);
        if elapsed == 0 {
            return (false, None);
        }

        let remaining = u64::from(self.state.time_remaining_secs).saturating_sub(elapsed);
        // Never larger than the previous remaining time, so it fits.
        self.state.time_remaining_secs = u32::try_from(remaining).unwrap_or(0);

        if self.state.is_focus() {
            self.check_day_rollover();
            self.state.today_focused_secs = self.state.today_focused_secs.saturating_add(elapsed);
            self.persist_stats();
        }

        if self.state.time_remaining_secs > 0 {
            return (true, None);
        }

        let event = match self.state.mode {
            TimerMode::Focus => self.finish_focus(),
            TimerMode::Break => self.finish_break(),
        };
        (true, Some(event))
    }

    /// Forces a break with its full duration. No-op while already on a break.
    pub fn skip_to_break(&mut self) -> bool {
        if self.state.is_break() {
            return false;
        }
        info!(cycle = self.state.current_cycle, "skipped to break");
        self.enter(TimerMode::Break);
        true
    }

    /// Forces the next focus session, advancing the cycle. Skipping away from
    /// a focus session in progress earns no credit.
    pub fn skip_to_next_focus(&mut self) {
        self.state.current_cycle = self.config.next_cycle(self.state.current_cycle);
        info!(cycle = self.state.current_cycle, "skipped to next focus");
        self.enter(TimerMode::Focus);
    }

    /// Skips whatever the current mode is: focus goes to break, break goes to focus.
    pub fn skip(&mut self) {
        match self.state.mode {
            TimerMode::Focus => {
                self.skip_to_break();
            }
            TimerMode::Break => self.skip_to_next_focus(),
        }
    }

    /// Back to the first focus session of a set. Today's stats are kept.
    pub fn reset(&mut self) {
        self.state.current_cycle = 1;
        self.enter(TimerMode::Focus);
        debug!("timer reset");
    }

    /// Switches today's stats over to a new calendar day once the local date changes.
    pub fn check_day_rollover(&mut self) {
        let today = self.clock.today();
        if today == self.stats_date {
            return;
        }

        let stats = load_stats(&self.store, today);
        info!(from = %self.stats_date, to = %today, "day rolled over");
        self.stats_date = today;
        self.state.today_focused_secs = stats.focused_seconds;
        self.state.today_completed_sessions = stats.completed_sessions;
    }

    fn finish_focus(&mut self) -> CompletionEvent {
        self.check_day_rollover();
        self.state.today_completed_sessions = self.state.today_completed_sessions.saturating_add(1);
        self.persist_stats();
        self.enter(TimerMode::Break);

        info!(
            completed_today = self.state.today_completed_sessions,
            "focus session complete"
        );
        CompletionEvent::FocusComplete {
            completed_today: self.state.today_completed_sessions,
        }
    }

    fn finish_break(&mut self) -> CompletionEvent {
        self.state.current_cycle = self.config.next_cycle(self.state.current_cycle);
        self.enter(TimerMode::Focus);

        info!(next_cycle = self.state.current_cycle, "break complete");
        CompletionEvent::BreakComplete {
            next_cycle: self.state.current_cycle,
        }
    }

    /// Puts the timer at the start of `mode`, paused.
    fn enter(&mut self, mode: TimerMode) {
        self.state.mode = mode;
        self.state.time_remaining_secs = self.config.duration_for(mode);
        self.state.is_running = false;
        self.disarm();
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.armed.take() {
            self.scheduler.disarm(handle);
        }
    }

    fn persist_stats(&self) {
        let key = date_key(self.stats_date);
        if let Err(e) = self.store.write(&key, &self.state.today_stats()) {
            // The next accrual writes the full record again.
            warn!(error = %e, key = %key, "failed to persist daily stats");
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

fn load_stats<S: StatsStore>(store: &S, date: NaiveDate) -> DailyStatsRecord {
    let key = date_key(date);
    match store.read(&key) {
        Ok(record) => record.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, key = %key, "failed to load daily stats, starting from zero");
            DailyStatsRecord::default()
        }
    }
}

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats a focused-time total as `Xh Ym`, or `Ym` under an hour.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
