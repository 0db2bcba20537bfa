//! Screen rendering for the terminal timer.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{TimerConfig, TimerMode, TimerState};
use crate::quotes::quote_for;
use crate::scheduler::Scheduler;
use crate::tasks::Task;
use crate::timer::{format_duration, format_time};
use crate::tui::{Overlay, Section, UiState};

/// Render the whole screen.
pub fn render<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Section
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, ui, chunks[0]);
    match ui.section {
        Section::Timer => render_timer(frame, app, ui, chunks[1]),
        Section::Year => render_year(frame, app, chunks[1]),
    }
    render_status_bar(frame, ui, chunks[2]);

    match ui.overlay {
        None => {}
        Some(Overlay::ConfirmSkip) => render_confirm_skip(frame),
        Some(Overlay::Share) => render_share(frame, app),
        Some(Overlay::Notes) => render_notes(frame, app),
        Some(Overlay::Todo) => render_todo(frame, app, ui),
    }
}

fn render_header<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>, ui: &UiState, area: Rect) {
    let tab = |label: &'static str, section: Section| {
        if ui.section == section {
            Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(label, Style::default().fg(Color::DarkGray))
        }
    };

    let focused = app.timer.state().today_focused_secs;
    let header = Paragraph::new(Line::from(vec![
        tab(" [1] Timer ", Section::Timer),
        tab(" [2] Progress ", Section::Year),
        Span::raw("   "),
        Span::styled(
            format!("{} focused today", format_duration(focused)),
            Style::default().fg(Color::Yellow),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(header, area);
}

fn render_timer<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>, ui: &UiState, area: Rect) {
    let state = app.timer.state();
    let accent = mode_color(state.mode);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Mode tabs
            Constraint::Length(1),
            Constraint::Length(3), // Countdown
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Details
        ])
        .margin(1)
        .split(area);

    let mode_tab = |mode: TimerMode| {
        let style = if state.mode == mode {
            Style::default()
                .fg(Color::Black)
                .bg(mode_color(mode))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" {} ", mode.label().to_uppercase()), style)
    };
    let tabs = Paragraph::new(Line::from(vec![
        mode_tab(TimerMode::Focus),
        Span::raw("  "),
        mode_tab(TimerMode::Break),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(tabs, chunks[0]);

    let countdown = Paragraph::new(vec![
        Line::from(Span::styled(
            format_time(state.time_remaining_secs),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(format_status(state)),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(countdown, chunks[2]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(accent).bg(Color::Black))
        .ratio(app.timer.progress_fraction())
        .label(format_cycle(state, app.timer.config()));
    frame.render_widget(gauge, chunks[3]);

    let mut details = vec![Line::from(Span::styled(
        if state.is_running {
            "[space] Pause   [s] Skip"
        } else {
            "[space] Start   [s] Skip"
        },
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(task) = app.tasks.active_task() {
        details.push(Line::from(""));
        details.push(Line::from(format_task_progress(task)));
    }
    details.push(Line::from(""));
    details.push(Line::from(Span::styled(
        quote_for(ui.quote_mode, ui.quote_seed),
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    )));

    let details = Paragraph::new(details)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(details, chunks[4]);
}

fn render_year<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>, area: Rect) {
    let progress = app.year_progress();
    let daily = app.settings.daily_pomodoros;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Gauge
            Constraint::Min(0),    // Countdown and projection
        ])
        .margin(1)
        .split(area);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Year Progress "),
        )
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio((progress.percentage / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.2}% of the year has passed", progress.percentage));
    frame.render_widget(gauge, chunks[0]);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} days  {} hours  {} minutes  {} seconds left",
                progress.days, progress.hours, progress.minutes, progress.seconds
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "At {daily} pomodoros a day you will finish about {}+ pomodoros by the end of the year.",
            progress.estimated_pomodoros(daily)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[+/-] pomodoros per day",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, chunks[1]);
}

fn render_status_bar(frame: &mut Frame<'_>, ui: &UiState, area: Rect) {
    let status_text = ui
        .status
        .as_deref()
        .unwrap_or("space:start/pause | s:skip | t:todo | n:notes | c:share | ?:help | q:quit");

    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

fn render_confirm_skip(frame: &mut Frame<'_>) {
    let area = centered_rect(50, 30, frame.area());
    let lines = vec![
        Line::from(Span::styled(
            "Skip to break?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Are you sure you want to skip this focus session?"),
        Line::from("Your progress will not be saved."),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Skip   [n] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(popup_block(" Skip "));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_share<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>) {
    let area = centered_rect(70, 80, frame.area());
    let popup = Paragraph::new(app.share_text())
        .wrap(Wrap { trim: false })
        .block(popup_block(" Share (Esc to close) "));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_notes<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>) {
    let area = centered_rect(70, 70, frame.area());
    let text = if app.notes.is_empty() {
        Text::from(Line::from(vec![
            Span::raw("▏"),
            Span::styled("Write your notes here", Style::default().fg(Color::DarkGray)),
        ]))
    } else {
        Text::from(format!("{}▏", app.notes.text()))
    };
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(popup_block(" Notes (Esc to close, Ctrl+U to clear) "));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn render_todo<K: Scheduler>(frame: &mut Frame<'_>, app: &App<K>, ui: &UiState) {
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let active = app.tasks.active_id();
    let tasks = app.tasks.today_tasks(app.today());
    let items: Vec<ListItem<'_>> = if tasks.is_empty() {
        vec![ListItem::new(Span::styled(
            "No tasks yet. Press a to add one.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        tasks
            .iter()
            .map(|task| {
                let marker = if active == Some(task.id) { "▶ " } else { "  " };
                let check = if task.is_completed { "[x] " } else { "[ ] " };
                let name_style = if task.is_completed {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Red)),
                    Span::styled(
                        check,
                        Style::default().fg(if task.is_completed {
                            Color::Green
                        } else {
                            Color::White
                        }),
                    ),
                    Span::styled(task.name.as_str(), name_style),
                    Span::styled(
                        format!("  {}/{}", task.completed_pomodoros, task.planned_pomodoros),
                        Style::default().fg(Color::Yellow),
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(popup_block(" Today's Tasks "))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !tasks.is_empty() {
        state.select(Some(ui.task_cursor));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let footer = match &ui.task_input {
        Some(input) => Paragraph::new(format!(
            "New task: {input}▏  ({} pomodoros, ↑/↓ to change)",
            ui.new_task_pomodoros
        ))
        .block(popup_block(" Add ")),
        None => Paragraph::new(
            "a:add | Enter:work on | x:done | +/-:planned | d:delete | Esc:close",
        )
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL)),
    };
    frame.render_widget(footer, chunks[1]);
}

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

fn mode_color(mode: TimerMode) -> Color {
    match mode {
        TimerMode::Focus => Color::Red,
        TimerMode::Break => Color::Green,
    }
}

/// Formats the line under the countdown.
pub fn format_status(state: &TimerState) -> String {
    match (state.mode, state.is_running) {
        (TimerMode::Focus, true) => "⏱  Focusing".to_string(),
        (TimerMode::Focus, false) => "⏸  Focus paused".to_string(),
        (TimerMode::Break, true) => "☕  On a break".to_string(),
        (TimerMode::Break, false) => "⏸  Break paused".to_string(),
    }
}

/// Formats the position within the current set, e.g. "Pomodoro 2/4".
pub fn format_cycle(state: &TimerState, config: &TimerConfig) -> String {
    format!(
        "Pomodoro {}/{}",
        state.current_cycle, config.cycles_per_set
    )
}

/// Formats a task with its pomodoro progress, e.g. "Write report • 1/3".
pub fn format_task_progress(task: &Task) -> String {
    format!(
        "{} • {}/{}",
        task.name, task.completed_pomodoros, task.planned_pomodoros
    )
}

/// Rect of the given percentage size centered in `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
