//! Main application state and logic.

use std::rc::Rc;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::{date_key, Clock};
use crate::models::{DailyStatsRecord, Settings, TimerConfig};
use crate::notes::Notes;
use crate::persistence::{Database, DatabaseError, StatsStore};
use crate::scheduler::{Scheduler, TimerMessage};
use crate::share::share_text;
use crate::tasks::{TaskError, TaskList, TaskUpdate};
use crate::timer::{CompletionEvent, TimerEngine};
use crate::year::YearProgress;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Task(#[from] TaskError),
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// Timer, tasks, notes and settings, backed by one database.
pub struct App<K: Scheduler> {
    pub timer: TimerEngine<Rc<Database>, K>,
    pub tasks: TaskList,
    pub notes: Notes,
    pub settings: Settings,
    db: Rc<Database>,
    clock: Arc<dyn Clock>,
}

impl<K: Scheduler> App<K> {
    /// Loads everything persisted in `db` and builds a paused timer.
    /// Records that cannot be read are logged and replaced by defaults.
    pub fn new(db: Database, scheduler: K, clock: Arc<dyn Clock>) -> Self {
        let settings = load_or_default(db.load_settings(), "settings");
        let tasks = TaskList::from_tasks(load_or_default(db.load_tasks(), "tasks"));
        let notes = Notes::new(load_or_default(db.load_notes(), "notes"));

        let db = Rc::new(db);
        let timer = TimerEngine::new(
            TimerConfig::DEFAULT,
            Rc::clone(&db),
            scheduler,
            Arc::clone(&clock),
        );

        Self {
            timer,
            tasks,
            settings,
            notes,
            db,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Applies a message from the scheduler thread.
    /// Returns a completion event if a countdown finished.
    pub fn on_timer_message(&mut self, msg: TimerMessage) -> Option<CompletionEvent> {
        match msg {
            TimerMessage::Tick(handle) => {
                let (_, completion) = self.timer.on_scheduled_tick(handle);
                if let Some(CompletionEvent::FocusComplete { .. }) = completion {
                    self.credit_active_task();
                }
                completion
            }
        }
    }

    /// Picks up a new calendar day while the timer sits idle.
    pub fn refresh_day(&mut self) {
        self.timer.check_day_rollover();
    }

    fn credit_active_task(&mut self) {
        if let Some(id) = self.tasks.active_id() {
            if self.tasks.increment_pomodoro(id).is_ok() {
                debug!(%id, "credited pomodoro to active task");
                self.save_tasks();
            }
        }
    }

    /// Statistics for `date`; today's come from the live timer.
    pub fn daily_stats(&self, date: NaiveDate) -> Result<DailyStatsRecord, AppError> {
        if date == self.today() {
            return Ok(self.timer.state().today_stats());
        }
        Ok(self.db.read(&date_key(date))?.unwrap_or_default())
    }

    pub fn add_task(&mut self, name: &str, planned_pomodoros: u32) -> Result<Uuid, AppError> {
        let id = self.tasks.add(name, planned_pomodoros, self.today())?;
        self.save_tasks();
        Ok(id)
    }

    pub fn update_task(&mut self, id: Uuid, update: TaskUpdate) -> Result<(), AppError> {
        self.tasks.update(id, update)?;
        self.save_tasks();
        Ok(())
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<(), AppError> {
        self.tasks.delete(id)?;
        self.save_tasks();
        Ok(())
    }

    pub fn toggle_task(&mut self, id: Uuid) -> Result<(), AppError> {
        self.tasks.toggle_complete(id)?;
        self.save_tasks();
        Ok(())
    }

    /// Selects the task credited when a focus session completes.
    pub fn select_task(&mut self, id: Option<Uuid>) -> Result<(), AppError> {
        self.tasks.set_active(id)?;
        Ok(())
    }

    /// Applies an edit to the notes and saves them.
    pub fn edit_notes<F>(&mut self, editor: F)
    where
        F: FnOnce(&mut Notes),
    {
        editor(&mut self.notes);
        if let Err(e) = self.db.save_notes(self.notes.text()) {
            warn!(error = %e, "failed to save notes");
        }
    }

    /// Updates a setting and saves to database.
    pub fn update_setting<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        updater(&mut self.settings);
        if let Err(e) = self.db.save_settings(&self.settings) {
            warn!(error = %e, "failed to save settings");
        }
    }

    /// Today's plan and results as shareable text.
    pub fn share_text(&self) -> String {
        let state = self.timer.state();
        share_text(
            self.today(),
            self.tasks.tasks(),
            state.today_focused_secs,
            state.today_completed_sessions,
        )
    }

    pub fn year_progress(&self) -> YearProgress {
        YearProgress::at(self.clock.now().naive_local())
    }

    fn save_tasks(&self) {
        if let Err(e) = self.db.save_tasks(self.tasks.tasks()) {
            warn!(error = %e, "failed to save tasks");
        }
    }
}

/// Unreadable records start from their defaults; the next save overwrites them.
fn load_or_default<T: Default>(loaded: Result<T, DatabaseError>, what: &str) -> T {
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, what, "failed to load, using defaults");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::TimerMode;
    use crate::scheduler::ManualScheduler;

    fn create_test_app() -> (App<ManualScheduler>, Arc<ManualClock>) {
        let db = Database::new_in_memory().unwrap();
        let clock = Arc::new(ManualClock::fixed());
        let app = App::new(db, ManualScheduler::default(), clock.clone());
        (app, clock)
    }

    /// Starts the timer and lets `secs` of wall-clock time pass in one tick.
    fn run_for(
        app: &mut App<ManualScheduler>,
        clock: &ManualClock,
        secs: i64,
    ) -> Option<CompletionEvent> {
        app.timer.start();
        let handle = app.timer.armed_handle().unwrap();
        clock.advance_secs(secs);
        app.on_timer_message(TimerMessage::Tick(handle))
    }

    #[test]
    fn test_app_initial_state() {
        let (app, _) = create_test_app();
        assert_eq!(app.settings, Settings::default());
        assert!(app.tasks.tasks().is_empty());
        assert!(app.notes.is_empty());
        assert_eq!(app.timer.state().mode, TimerMode::Focus);
        assert!(!app.timer.state().is_running);
    }

    #[test]
    fn test_tick_message_drives_timer() {
        let (mut app, clock) = create_test_app();
        let event = run_for(&mut app, &clock, 90);

        assert_eq!(event, None);
        assert_eq!(app.timer.state().time_remaining_secs, 1410);
        assert_eq!(app.daily_stats(app.today()).unwrap().focused_seconds, 90);
    }

    #[test]
    fn test_focus_completion_credits_active_task() {
        let (mut app, clock) = create_test_app();
        let id = app.add_task("Write report", 1).unwrap();
        app.select_task(Some(id)).unwrap();

        let event = run_for(&mut app, &clock, 1500);

        assert_eq!(
            event,
            Some(CompletionEvent::FocusComplete { completed_today: 1 })
        );
        let task = app.tasks.get(id).unwrap();
        assert_eq!(task.completed_pomodoros, 1);
        assert!(task.is_completed);
        assert_eq!(app.db.load_tasks().unwrap()[0].completed_pomodoros, 1);
    }

    #[test]
    fn test_break_completion_does_not_credit_task() {
        let (mut app, clock) = create_test_app();
        let id = app.add_task("Read", 3).unwrap();
        app.select_task(Some(id)).unwrap();
        app.timer.skip_to_break();

        let event = run_for(&mut app, &clock, 300);

        assert_eq!(event, Some(CompletionEvent::BreakComplete { next_cycle: 2 }));
        assert_eq!(app.tasks.get(id).unwrap().completed_pomodoros, 0);
    }

    #[test]
    fn test_skip_does_not_credit_task() {
        let (mut app, clock) = create_test_app();
        let id = app.add_task("Read", 3).unwrap();
        app.select_task(Some(id)).unwrap();
        run_for(&mut app, &clock, 600);

        app.timer.skip();

        assert_eq!(app.tasks.get(id).unwrap().completed_pomodoros, 0);
        assert_eq!(app.timer.state().today_completed_sessions, 0);
    }

    #[test]
    fn test_task_changes_are_persisted() {
        let (mut app, _) = create_test_app();
        let keep = app.add_task("Keep", 2).unwrap();
        let gone = app.add_task("Drop", 1).unwrap();

        app.toggle_task(keep).unwrap();
        app.update_task(
            keep,
            TaskUpdate {
                planned_pomodoros: Some(4),
                ..TaskUpdate::default()
            },
        )
        .unwrap();
        app.delete_task(gone).unwrap();

        let stored = app.db.load_tasks().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Keep");
        assert_eq!(stored[0].planned_pomodoros, 4);
        assert!(stored[0].is_completed);
    }

    #[test]
    fn test_task_errors_surface() {
        let (mut app, _) = create_test_app();
        assert!(matches!(
            app.add_task("  ", 1),
            Err(AppError::Task(TaskError::EmptyName))
        ));
        assert!(matches!(
            app.delete_task(Uuid::new_v4()),
            Err(AppError::Task(TaskError::NotFound(_)))
        ));
    }

    #[test]
    fn test_notes_are_persisted() {
        let (mut app, _) = create_test_app();
        app.edit_notes(|n| n.update("buy milk"));
        assert_eq!(app.db.load_notes().unwrap(), "buy milk");

        app.edit_notes(Notes::clear);
        assert_eq!(app.db.load_notes().unwrap(), "");
    }

    #[test]
    fn test_update_setting() {
        let (mut app, _) = create_test_app();
        app.update_setting(|s| s.daily_pomodoros = 6);

        assert_eq!(app.settings.daily_pomodoros, 6);

        // Verify it was saved
        let loaded = app.db.load_settings().unwrap();
        assert_eq!(loaded.daily_pomodoros, 6);
    }

    #[test]
    fn test_daily_stats_for_other_dates() {
        let (app, _) = create_test_app();
        let record = DailyStatsRecord {
            focused_seconds: 3000,
            completed_sessions: 2,
        };
        app.db.write("2024-03-01", &record).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(app.daily_stats(date).unwrap(), record);
        let empty = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(app.daily_stats(empty).unwrap(), DailyStatsRecord::default());
    }

    #[test]
    fn test_share_text_uses_live_stats() {
        let (mut app, clock) = create_test_app();
        let id = app.add_task("Write report", 1).unwrap();
        app.select_task(Some(id)).unwrap();
        run_for(&mut app, &clock, 1500);

        let text = app.share_text();

        assert!(text.starts_with("12/03/2024"));
        assert!(text.contains("- Write report | Pomodoro: 1 ✅"));
        assert!(text.contains("🍅 Total Pomodoro: 1"));
        assert!(text.contains("📈 Total Time Focused: 25m"));
    }

    #[test]
    fn test_corrupt_records_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = Database::open_in(dir.path()).unwrap();
            let conn = rusqlite::Connection::open(dir.path().join("pomodesk.db")).unwrap();
            for key in ["pomodoro_tasks", "settings"] {
                conn.execute(
                    "INSERT OR REPLACE INTO kv (key, value) VALUES (?, 'garbage')",
                    [key],
                )
                .unwrap();
            }
            drop(db);
        }

        let db = Database::open_in(dir.path()).unwrap();
        let mut app =
            App::new(db, ManualScheduler::default(), Arc::new(ManualClock::fixed()));
        assert!(app.tasks.tasks().is_empty());
        assert_eq!(app.settings, Settings::default());

        // The next save replaces the bad record.
        app.add_task("Fresh start", 1).unwrap();
        assert_eq!(app.db.load_tasks().unwrap()[0].name, "Fresh start");
    }

    #[test]
    fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::fixed());
        {
            let db = Database::open_in(dir.path()).unwrap();
            let mut app = App::new(db, ManualScheduler::default(), clock.clone());
            app.add_task("Persist me", 2).unwrap();
            run_for(&mut app, &clock, 200);
        }

        let db = Database::open_in(dir.path()).unwrap();
        let app = App::new(db, ManualScheduler::default(), clock.clone());
        assert_eq!(app.tasks.tasks()[0].name, "Persist me");
        assert_eq!(app.timer.state().today_focused_secs, 200);
        // The countdown itself starts fresh.
        assert_eq!(app.timer.state().time_remaining_secs, 1500);
    }
}
