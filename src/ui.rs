use crate::board::{Dialog, TodoBoard, COLUMNS};
use crate::cache::LoadState;
use crate::classify;
use crate::form::{self, Field, FormMode, TaskForm};
use crate::repository::TaskRepository;
use crate::storage::LocalStorage;
use crate::task::Task;
use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};

const IDLE_TICK: Duration = Duration::from_millis(250);
const HELP: &str = "a add  e edit  enter details  space toggle  d delete  r reload  q quit";

pub fn run_app<B, R, S>(
    terminal: &mut Terminal<B>,
    board: &mut TodoBoard<R, S>,
    refresh_every: Option<Duration>,
) -> io::Result<()>
where
    B: Backend,
    R: TaskRepository,
    S: LocalStorage,
{
    let mut last_refresh = Instant::now();
    loop {
        terminal.draw(|f| render(f, &*board, Utc::now()))?;

        let timeout = refresh_every
            .map(|every| every.saturating_sub(last_refresh.elapsed()).min(IDLE_TICK))
            .unwrap_or(IDLE_TICK);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(board, key) {
                    return Ok(());
                }
            }
        }

        if let Some(every) = refresh_every {
            if last_refresh.elapsed() >= every {
                board.refresh();
                last_refresh = Instant::now();
            }
        }
    }
}

/// Applies one key press. Returns `false` when the app should quit.
pub fn handle_key<R: TaskRepository, S: LocalStorage>(
    board: &mut TodoBoard<R, S>,
    key: KeyEvent,
) -> bool {
    if matches!(board.dialog, Dialog::Form(_)) {
        handle_form_key(board, key.code);
        return true;
    }
    if matches!(board.dialog, Dialog::Detail(_)) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => board.close_dialog(),
            KeyCode::Char('e') => board.open_edit(),
            _ => {}
        }
        return true;
    }
    match key.code {
        KeyCode::Char('q') => false,
        KeyCode::Char('a') => {
            board.open_add();
            true
        }
        KeyCode::Char('e') => {
            board.open_edit();
            true
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            board.delete_selected();
            true
        }
        KeyCode::Char(' ') => {
            board.toggle_selected();
            true
        }
        KeyCode::Char('r') => {
            board.refresh();
            true
        }
        KeyCode::Enter => {
            board.open_detail();
            true
        }
        KeyCode::Left | KeyCode::Char('h') => {
            board.move_column(-1);
            true
        }
        KeyCode::Right | KeyCode::Char('l') => {
            board.move_column(1);
            true
        }
        KeyCode::Up | KeyCode::Char('k') => {
            board.move_selection(-1);
            true
        }
        KeyCode::Down | KeyCode::Char('j') => {
            board.move_selection(1);
            true
        }
        _ => true,
    }
}

fn handle_form_key<R: TaskRepository, S: LocalStorage>(board: &mut TodoBoard<R, S>, code: KeyCode) {
    match code {
        KeyCode::Esc => board.close_dialog(),
        KeyCode::Enter => {
            board.submit_form();
        }
        _ => {
            let Some(form) = board.form_mut() else {
                return;
            };
            match code {
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.push(c),
                _ => {}
            }
        }
    }
}

pub fn render<R: TaskRepository, S: LocalStorage>(
    f: &mut Frame,
    board: &TodoBoard<R, S>,
    now: DateTime<Utc>,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(
            "ToDo items",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        rows[0],
    );

    let tasks = board.sync.tasks();
    match board.sync.state() {
        LoadState::Failed(message) => {
            f.render_widget(
                Paragraph::new(message.as_str()).block(Block::default().borders(Borders::ALL)),
                rows[1],
            );
        }
        LoadState::Loading if tasks.is_empty() => {
            f.render_widget(
                Paragraph::new("Loading...").block(Block::default().borders(Borders::ALL)),
                rows[1],
            );
        }
        _ => render_columns(f, board, rows[1], now),
    }

    let footer = match &board.message {
        Some(message) => Span::styled(message.as_str(), Style::default().fg(Color::Red)),
        None => Span::raw(HELP),
    };
    f.render_widget(Paragraph::new(footer), rows[2]);

    match &board.dialog {
        Dialog::None => {}
        Dialog::Detail(id) => {
            if let Some(task) = board.sync.cache().get(*id) {
                render_detail(f, task);
            }
        }
        Dialog::Form(form) => render_form(f, form),
    }
}

fn render_columns<R: TaskRepository, S: LocalStorage>(
    f: &mut Frame,
    board: &TodoBoard<R, S>,
    area: Rect,
    now: DateTime<Utc>,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (i, title) in COLUMNS.iter().enumerate() {
        let items: Vec<ListItem> = board
            .column(i)
            .into_iter()
            .map(|t| task_item(t, now, board.deadline_window))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(*title)
                    .borders(Borders::ALL)
                    .border_style(if board.selected_column == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if board.selected_column == i {
            state.select(Some(board.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn task_item(task: &Task, now: DateTime<Utc>, window: chrono::Duration) -> ListItem<'static> {
    let check = if task.is_completed() { "[x] " } else { "[ ] " };
    let mut spans = vec![
        Span::raw(check),
        Span::raw(format!("#{} ", task.id)),
        Span::styled(task.title.clone(), Style::default().fg(Color::White)),
    ];
    if let Some(deadline) = task.deadline {
        let style = if classify::is_approaching_deadline(task, now, window) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" (Due: {})", deadline.format("%Y-%m-%d %H:%M")),
            style,
        ));
    }
    ListItem::new(Line::from(spans))
}

fn render_detail(f: &mut Frame, task: &Task) {
    let area = centered(f.area(), 60, 50);
    let lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Status: {}", task.status)),
        Line::from(format!(
            "Deadline: {}",
            task.deadline
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "none".to_string())
        )),
        Line::from(format!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"))),
        Line::from(format!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"))),
        Line::from(""),
        Line::from(task.description.clone()),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Details (e edit, esc close)").borders(Borders::ALL)),
        area,
    );
}

fn render_form(f: &mut Frame, form: &TaskForm) {
    let area = centered(f.area(), 60, 40);
    let title = match form.mode {
        FormMode::Add => "Add New ToDo Item",
        FormMode::Edit(_) => "Edit ToDo Item",
    };
    let mut lines: Vec<Line> = Field::ALL
        .iter()
        .map(|field| {
            let focused = *field == form.focus;
            let marker = if focused { "> " } else { "  " };
            let hint = if *field == Field::Deadline && !focused && form.deadline.is_empty() {
                "YYYY-MM-DDTHH:MM"
            } else {
                ""
            };
            Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{:<12}", field.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(form.value(*field).to_string()),
                Span::styled(hint, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Title: {}/{} characters",
        form.title.trim().chars().count(),
        form::TITLE_MAX_CHARS
    )));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(format!("{title} (tab next, enter save, esc close)"))
                .borders(Borders::ALL),
        ),
        area,
    );
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
