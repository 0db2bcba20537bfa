//! Key event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::app::App;
use crate::scheduler::Scheduler;
use crate::tasks::{TaskUpdate, PLANNED_POMODOROS_RANGE};
use crate::tui::{Overlay, Section, UiState};
use crate::year::clamp_daily;

const HELP: &str =
    "space start/pause · s skip · r reset · 1/2 timer/year · t todo · n notes · c share · q quit";

/// Result of handling a key event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Event handled, continue running.
    Continue,
    /// User requested quit.
    Quit,
}

/// Handles a key press and updates the app and UI state accordingly.
pub fn handle_key_event<K: Scheduler>(
    app: &mut App<K>,
    ui: &mut UiState,
    key: KeyEvent,
) -> EventResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return EventResult::Quit;
    }

    match ui.overlay {
        None => return handle_main(app, ui, key),
        Some(Overlay::ConfirmSkip) => handle_confirm_skip(app, ui, key),
        Some(Overlay::Share) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | 'c')) {
                ui.overlay = None;
            }
        }
        Some(Overlay::Notes) => handle_notes(app, ui, key),
        Some(Overlay::Todo) => {
            if ui.task_input.is_some() {
                handle_task_input(app, ui, key);
            } else {
                handle_todo(app, ui, key);
            }
        }
    }
    EventResult::Continue
}

fn handle_main<K: Scheduler>(app: &mut App<K>, ui: &mut UiState, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return EventResult::Quit,
        KeyCode::Char(' ') => app.timer.toggle(),
        KeyCode::Char('s') => {
            let state = app.timer.state();
            if state.is_focus() && state.is_running {
                ui.overlay = Some(Overlay::ConfirmSkip);
            } else {
                app.timer.skip();
            }
        }
        KeyCode::Char('r') => {
            app.timer.reset();
            ui.status = Some("Timer reset".to_string());
        }
        KeyCode::Char('1') => ui.section = Section::Timer,
        KeyCode::Char('2') => ui.section = Section::Year,
        KeyCode::Char('c') => ui.toggle_overlay(Overlay::Share),
        KeyCode::Char('n') => ui.toggle_overlay(Overlay::Notes),
        KeyCode::Char('t') => {
            ui.toggle_overlay(Overlay::Todo);
            clamp_cursor(app, ui);
        }
        KeyCode::Char(c @ ('+' | '-')) if ui.section == Section::Year => {
            let current = app.settings.daily_pomodoros;
            let daily = if c == '+' {
                current.saturating_add(1)
            } else {
                current.saturating_sub(1)
            };
            app.update_setting(|s| s.daily_pomodoros = clamp_daily(daily));
        }
        KeyCode::Char('?') => ui.status = Some(HELP.to_string()),
        _ => {}
    }
    EventResult::Continue
}

fn handle_confirm_skip<K: Scheduler>(app: &mut App<K>, ui: &mut UiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.timer.skip_to_break();
            ui.overlay = None;
        }
        KeyCode::Char('n') | KeyCode::Esc => ui.overlay = None,
        _ => {}
    }
}

fn handle_notes<K: Scheduler>(app: &mut App<K>, ui: &mut UiState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => ui.overlay = None,
        KeyCode::Char('u') if ctrl => app.edit_notes(|n| n.clear()),
        KeyCode::Char(c) if !ctrl => app.edit_notes(|n| n.push(c)),
        KeyCode::Enter => app.edit_notes(|n| n.push('\n')),
        KeyCode::Backspace => app.edit_notes(|n| n.backspace()),
        _ => {}
    }
}

fn handle_todo<K: Scheduler>(app: &mut App<K>, ui: &mut UiState, key: KeyEvent) {
    let today = app.tasks.today_tasks(app.today());
    let count = today.len();
    let selected = today.get(ui.task_cursor).map(|t| (t.id, t.planned_pomodoros));

    match key.code {
        KeyCode::Esc | KeyCode::Char('t' | 'q') => ui.overlay = None,
        KeyCode::Char('j') | KeyCode::Down => {
            if ui.task_cursor + 1 < count {
                ui.task_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => ui.task_cursor = ui.task_cursor.saturating_sub(1),
        KeyCode::Char('a') => {
            ui.task_input = Some(String::new());
            ui.new_task_pomodoros = 1;
        }
        KeyCode::Char(' ' | 'x') => {
            if let Some((id, _)) = selected {
                report(ui, app.toggle_task(id));
            }
        }
        KeyCode::Char('d') => {
            if let Some((id, _)) = selected {
                report(ui, app.delete_task(id));
                clamp_cursor(app, ui);
            }
        }
        KeyCode::Enter => {
            if let Some((id, _)) = selected {
                let next = if app.tasks.active_id() == Some(id) {
                    None
                } else {
                    Some(id)
                };
                report(ui, app.select_task(next));
            }
        }
        KeyCode::Char(c @ ('+' | '-')) => {
            if let Some((id, planned)) = selected {
                let planned = if c == '+' {
                    planned.saturating_add(1)
                } else {
                    planned.saturating_sub(1)
                };
                let update = TaskUpdate {
                    planned_pomodoros: Some(planned),
                    ..TaskUpdate::default()
                };
                report(ui, app.update_task(id, update));
            }
        }
        _ => {}
    }
}

fn handle_task_input<K: Scheduler>(app: &mut App<K>, ui: &mut UiState, key: KeyEvent) {
    let Some(input) = ui.task_input.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Esc => ui.task_input = None,
        KeyCode::Enter => {
            let name = std::mem::take(input);
            match app.add_task(&name, ui.new_task_pomodoros) {
                Ok(_) => {
                    ui.task_input = None;
                    ui.task_cursor = app.tasks.today_tasks(app.today()).len().saturating_sub(1);
                }
                Err(e) => {
                    *input = name;
                    ui.status = Some(e.to_string());
                }
            }
        }
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Up => {
            ui.new_task_pomodoros = (ui.new_task_pomodoros + 1).min(*PLANNED_POMODOROS_RANGE.end());
        }
        KeyCode::Down => {
            ui.new_task_pomodoros = ui.new_task_pomodoros.saturating_sub(1).max(*PLANNED_POMODOROS_RANGE.start());
        }
        KeyCode::Char(c) => input.push(c),
        _ => {}
    }
}

fn clamp_cursor<K: Scheduler>(app: &App<K>, ui: &mut UiState) {
    let count = app.tasks.today_tasks(app.today()).len();
    ui.task_cursor = ui.task_cursor.min(count.saturating_sub(1));
}

fn report<E: std::fmt::Display>(ui: &mut UiState, result: Result<(), E>) {
    if let Err(e) = result {
        warn!(error = %e, "task action failed");
        ui.status = Some(e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::TimerMode;
    use crate::persistence::Database;
    use crate::scheduler::ManualScheduler;
    use std::sync::Arc;

    fn create_test_app() -> (App<ManualScheduler>, UiState) {
        let db = Database::new_in_memory().unwrap();
        let app = App::new(db, ManualScheduler::default(), Arc::new(ManualClock::fixed()));
        let ui = UiState::new(TimerMode::Focus);
        (app, ui)
    }

    fn press(app: &mut App<ManualScheduler>, ui: &mut UiState, code: KeyCode) -> EventResult {
        handle_key_event(app, ui, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App<ManualScheduler>, ui: &mut UiState, text: &str) {
        for c in text.chars() {
            press(app, ui, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, mut ui) = create_test_app();
        assert_eq!(press(&mut app, &mut ui, KeyCode::Char('q')), EventResult::Quit);
        assert_eq!(press(&mut app, &mut ui, KeyCode::Esc), EventResult::Quit);

        ui.overlay = Some(Overlay::Notes);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(&mut app, &mut ui, ctrl_c), EventResult::Quit);
    }

    #[test]
    fn test_space_toggles_timer() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char(' '));
        assert!(app.timer.state().is_running);
        press(&mut app, &mut ui, KeyCode::Char(' '));
        assert!(!app.timer.state().is_running);
    }

    #[test]
    fn test_skip_running_focus_asks_first() {
        let (mut app, mut ui) = create_test_app();
        app.timer.start();

        press(&mut app, &mut ui, KeyCode::Char('s'));
        assert_eq!(ui.overlay, Some(Overlay::ConfirmSkip));
        assert_eq!(app.timer.state().mode, TimerMode::Focus);

        press(&mut app, &mut ui, KeyCode::Char('n'));
        assert_eq!(ui.overlay, None);
        assert_eq!(app.timer.state().mode, TimerMode::Focus);

        press(&mut app, &mut ui, KeyCode::Char('s'));
        press(&mut app, &mut ui, KeyCode::Char('y'));
        assert_eq!(ui.overlay, None);
        assert_eq!(app.timer.state().mode, TimerMode::Break);
        assert!(!app.timer.state().is_running);
    }

    #[test]
    fn test_skip_paused_focus_and_break_is_immediate() {
        let (mut app, mut ui) = create_test_app();

        press(&mut app, &mut ui, KeyCode::Char('s'));
        assert_eq!(ui.overlay, None);
        assert_eq!(app.timer.state().mode, TimerMode::Break);

        press(&mut app, &mut ui, KeyCode::Char('s'));
        assert_eq!(app.timer.state().mode, TimerMode::Focus);
        assert_eq!(app.timer.state().current_cycle, 2);
    }

    #[test]
    fn test_reset() {
        let (mut app, mut ui) = create_test_app();
        app.timer.skip();
        app.timer.skip();
        press(&mut app, &mut ui, KeyCode::Char('r'));
        assert_eq!(app.timer.state().current_cycle, 1);
        assert_eq!(app.timer.state().mode, TimerMode::Focus);
    }

    #[test]
    fn test_notes_and_todo_are_exclusive() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char('n'));
        assert_eq!(ui.overlay, Some(Overlay::Notes));

        // Letters now go into the notes; Esc closes them first.
        press(&mut app, &mut ui, KeyCode::Char('t'));
        assert_eq!(app.notes.text(), "t");
        press(&mut app, &mut ui, KeyCode::Esc);
        press(&mut app, &mut ui, KeyCode::Char('t'));
        assert_eq!(ui.overlay, Some(Overlay::Todo));
    }

    #[test]
    fn test_notes_editing() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char('n'));
        type_str(&mut app, &mut ui, "hi");
        press(&mut app, &mut ui, KeyCode::Enter);
        type_str(&mut app, &mut ui, "there!");
        press(&mut app, &mut ui, KeyCode::Backspace);
        assert_eq!(app.notes.text(), "hi\nthere");

        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        handle_key_event(&mut app, &mut ui, ctrl_u);
        assert_eq!(app.notes.text(), "");
    }

    #[test]
    fn test_todo_add_select_and_toggle() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char('t'));
        press(&mut app, &mut ui, KeyCode::Char('a'));
        type_str(&mut app, &mut ui, "Write report");
        press(&mut app, &mut ui, KeyCode::Up);
        press(&mut app, &mut ui, KeyCode::Enter);

        assert_eq!(ui.task_input, None);
        let task = &app.tasks.tasks()[0];
        assert_eq!(task.name, "Write report");
        assert_eq!(task.planned_pomodoros, 2);
        let id = task.id;

        press(&mut app, &mut ui, KeyCode::Enter);
        assert_eq!(app.tasks.active_id(), Some(id));
        press(&mut app, &mut ui, KeyCode::Enter);
        assert_eq!(app.tasks.active_id(), None);

        press(&mut app, &mut ui, KeyCode::Char('x'));
        assert!(app.tasks.get(id).unwrap().is_completed);

        press(&mut app, &mut ui, KeyCode::Char('+'));
        assert_eq!(app.tasks.get(id).unwrap().planned_pomodoros, 3);
    }

    #[test]
    fn test_todo_blank_name_keeps_input_open() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char('t'));
        press(&mut app, &mut ui, KeyCode::Char('a'));
        type_str(&mut app, &mut ui, "  ");
        press(&mut app, &mut ui, KeyCode::Enter);

        assert_eq!(ui.task_input.as_deref(), Some("  "));
        assert!(app.tasks.tasks().is_empty());
        assert!(ui.status.is_some());
    }

    #[test]
    fn test_todo_delete_moves_cursor() {
        let (mut app, mut ui) = create_test_app();
        app.add_task("a", 1).unwrap();
        app.add_task("b", 1).unwrap();
        press(&mut app, &mut ui, KeyCode::Char('t'));
        press(&mut app, &mut ui, KeyCode::Char('j'));
        press(&mut app, &mut ui, KeyCode::Char('j'));
        assert_eq!(ui.task_cursor, 1);

        press(&mut app, &mut ui, KeyCode::Char('d'));
        assert_eq!(ui.task_cursor, 0);
        assert_eq!(app.tasks.tasks()[0].name, "a");
    }

    #[test]
    fn test_daily_pomodoros_only_in_year_section() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char('+'));
        assert_eq!(app.settings.daily_pomodoros, 3);

        press(&mut app, &mut ui, KeyCode::Char('2'));
        press(&mut app, &mut ui, KeyCode::Char('+'));
        assert_eq!(app.settings.daily_pomodoros, 4);

        for _ in 0..10 {
            press(&mut app, &mut ui, KeyCode::Char('-'));
        }
        assert_eq!(app.settings.daily_pomodoros, 1);
    }

    #[test]
    fn test_share_overlay() {
        let (mut app, mut ui) = create_test_app();
        press(&mut app, &mut ui, KeyCode::Char('c'));
        assert_eq!(ui.overlay, Some(Overlay::Share));
        // Timer keys are ignored under the popup.
        press(&mut app, &mut ui, KeyCode::Char(' '));
        assert!(!app.timer.state().is_running);
        press(&mut app, &mut ui, KeyCode::Esc);
        assert_eq!(ui.overlay, None);
    }
}
