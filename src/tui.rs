//! Interactive terminal timer.

use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self as term_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::info;

use crate::app::{App, AppError};
use crate::event::{handle_key_event, EventResult};
use crate::models::TimerMode;
use crate::notifications;
use crate::scheduler::{Scheduler, TimerMessage};
use crate::timer::CompletionEvent;
use crate::ui;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Timer,
    Year,
}

/// A popup drawn over the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Notes,
    Todo,
    Share,
    /// Asks before throwing away a running focus session.
    ConfirmSkip,
}

/// Presentation state that is not part of the app itself.
#[derive(Debug, Clone)]
pub struct UiState {
    pub section: Section,
    pub overlay: Option<Overlay>,
    /// Selected row in today's task list.
    pub task_cursor: usize,
    /// Name being typed for a new task.
    pub task_input: Option<String>,
    pub new_task_pomodoros: u32,
    pub quote_mode: TimerMode,
    pub quote_seed: u64,
    pub status: Option<String>,
}

impl UiState {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            section: Section::Timer,
            overlay: None,
            task_cursor: 0,
            task_input: None,
            new_task_pomodoros: 1,
            quote_mode: mode,
            quote_seed: fresh_seed(),
            status: Some("Press ? for help".to_string()),
        }
    }

    /// Opens `overlay`, or closes it if it is already open.
    pub fn toggle_overlay(&mut self, overlay: Overlay) {
        self.task_input = None;
        self.overlay = if self.overlay == Some(overlay) {
            None
        } else {
            Some(overlay)
        };
    }

    /// Picks a new quote whenever the timer changes mode.
    pub fn sync_quote(&mut self, mode: TimerMode) {
        if self.quote_mode != mode {
            self.quote_mode = mode;
            self.quote_seed = fresh_seed();
        }
    }
}

fn fresh_seed() -> u64 {
    u64::from(Local::now().timestamp_subsec_nanos())
}

/// Run the TUI until the user quits.
pub fn run<K: Scheduler>(app: &mut App<K>, timer_rx: &Receiver<TimerMessage>) -> Result<(), AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app, timer_rx);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_app<B: Backend, K: Scheduler>(
    terminal: &mut Terminal<B>,
    app: &mut App<K>,
    timer_rx: &Receiver<TimerMessage>,
) -> Result<(), AppError> {
    let mut ui_state = UiState::new(app.timer.state().mode);

    loop {
        app.refresh_day();
        ui_state.sync_quote(app.timer.state().mode);
        terminal.draw(|frame| ui::render(frame, app, &ui_state))?;

        while let Ok(msg) = timer_rx.try_recv() {
            if let Some(event) = app.on_timer_message(msg) {
                handle_completion(app, &mut ui_state, event);
            }
        }

        if term_event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = term_event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key_event(app, &mut ui_state, key) == EventResult::Quit
                {
                    info!("quit requested");
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_completion<K: Scheduler>(app: &App<K>, ui_state: &mut UiState, event: CompletionEvent) {
    if ui_state.overlay == Some(Overlay::ConfirmSkip) {
        ui_state.overlay = None;
    }

    ui_state.status = Some(match event {
        CompletionEvent::FocusComplete { completed_today } => {
            format!("Focus session done ({completed_today} today). Press space to start the break.")
        }
        CompletionEvent::BreakComplete { next_cycle } => {
            format!("Break over. Press space to start pomodoro #{next_cycle}.")
        }
    });

    if app.settings.notifications_enabled {
        notifications::notify_completion(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_overlay() {
        let mut state = UiState::new(TimerMode::Focus);
        state.toggle_overlay(Overlay::Notes);
        assert_eq!(state.overlay, Some(Overlay::Notes));

        // Opening another overlay replaces the first
        state.toggle_overlay(Overlay::Todo);
        assert_eq!(state.overlay, Some(Overlay::Todo));

        state.toggle_overlay(Overlay::Todo);
        assert_eq!(state.overlay, None);
    }

    #[test]
    fn test_toggle_overlay_drops_pending_input() {
        let mut state = UiState::new(TimerMode::Focus);
        state.toggle_overlay(Overlay::Todo);
        state.task_input = Some("half typed".into());

        state.toggle_overlay(Overlay::Todo);
        assert_eq!(state.task_input, None);
    }

    #[test]
    fn test_sync_quote_follows_mode() {
        let mut state = UiState::new(TimerMode::Focus);
        state.sync_quote(TimerMode::Focus);
        assert_eq!(state.quote_mode, TimerMode::Focus);

        state.sync_quote(TimerMode::Break);
        assert_eq!(state.quote_mode, TimerMode::Break);
    }
}
