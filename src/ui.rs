use crate::app::{App, BoardFocus, Route};
use crate::auth::{CredentialField, CredentialsForm};
use crate::board::{Board, Filter, FormField, TaskForm};
use crate::client::TaskApi;
use crate::form::Input;
use crate::notify::Level;
use crate::task::{Priority, Task};
use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_app<B: Backend, A: TaskApi>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;
        if app.should_quit() {
            return Ok(());
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
        app.tick(Instant::now());
    }
}

pub fn draw<A: TaskApi>(f: &mut Frame, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    match app.route() {
        Route::Signup => draw_credentials(
            f,
            chunks[0],
            "Signup",
            &app.signup.form,
            None,
            app.pending_redirect().is_some(),
        ),
        Route::Login => draw_credentials(
            f,
            chunks[0],
            "Login",
            &app.login.form,
            app.login.error.as_deref(),
            false,
        ),
        Route::Board => {
            if let Some(board) = app.board() {
                draw_board(f, chunks[0], app, board);
            }
        }
    }

    let help = Paragraph::new(help_line(app)).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[1]);

    draw_toasts(f, app);
}

fn help_line<A: TaskApi>(app: &App<A>) -> &'static str {
    match (app.route(), app.focus) {
        (Route::Signup, _) => "Tab switch field | Enter signup | F2 login | Esc quit",
        (Route::Login, _) => "Tab switch field | Enter login | F2 signup | Esc quit",
        (Route::Board, BoardFocus::List) => {
            "a add | Space toggle | e edit | d delete | / search | f/1-3 filter | r reload | l logout | q quit"
        }
        (Route::Board, BoardFocus::NewTask(_)) => {
            "Tab next field | ←/→ priority | Enter add task | Esc back"
        }
        (Route::Board, BoardFocus::Edit(_)) => "Tab next field | ←/→ priority | Enter save | Esc cancel",
        (Route::Board, BoardFocus::Search) => "type to search | Enter/Esc back",
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Draws a bordered single-line input and places the cursor in it when focused.
fn draw_input(f: &mut Frame, area: Rect, title: &str, input: &Input, focused: bool, masked: bool) {
    let shown = if masked {
        "*".repeat(input.value().chars().count())
    } else {
        input.value().to_string()
    };
    let field = Paragraph::new(shown).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(focus_style(focused)),
    );
    f.render_widget(field, area);

    if focused {
        f.set_cursor_position((cursor_column(area, input, masked), area.y.saturating_add(1)));
    }
}

/// Screen column of the cursor inside a bordered input, by display width and
/// clamped to the last inner column.
fn cursor_column(area: Rect, input: &Input, masked: bool) -> u16 {
    let offset = if masked {
        input.cursor()
    } else {
        let before: String = input.value().chars().take(input.cursor()).collect();
        Span::raw(before).width()
    };
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2))
}

fn draw_credentials(
    f: &mut Frame,
    area: Rect,
    title: &str,
    form: &CredentialsForm,
    error: Option<&str>,
    redirecting: bool,
) {
    let area = centered(area, 50, 12);
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    draw_input(
        f,
        rows[0],
        "Username",
        &form.username,
        form.focus == CredentialField::Username,
        false,
    );
    draw_input(
        f,
        rows[1],
        "Password",
        &form.password,
        form.focus == CredentialField::Password,
        true,
    );

    if let Some(error) = error {
        let alert = Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red));
        f.render_widget(alert, rows[2]);
    } else if redirecting {
        let note = Paragraph::new("Redirecting to login...")
            .style(Style::default().fg(Color::Green));
        f.render_widget(note, rows[2]);
    }

    let hint = if title == "Login" {
        "New user? Press F2 to sign up"
    } else {
        "Already existing user? Press F2 to log in"
    };
    let hint = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(hint, rows[3]);
}

fn priority_color(priority: &Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
        Priority::Other(_) => Color::Gray,
    }
}

fn draw_board<A: TaskApi>(f: &mut Frame, area: Rect, app: &App<A>, board: &Board) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(14),
            Constraint::Min(0),
        ])
        .split(area);

    let welcome = Paragraph::new(Line::from(vec![
        Span::raw("Welcome, "),
        Span::styled(
            board.username().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(welcome, rows[0]);

    if board.is_loading() {
        let loading = Paragraph::new("Loading tasks...")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(loading, rows[1]);
        return;
    }

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let new_task_focus = match app.focus {
        BoardFocus::NewTask(field) => Some(field),
        _ => None,
    };
    draw_task_form(f, top[0], "Add New Task", &board.new_task, new_task_focus);
    draw_filters(f, top[1], app, board);
    draw_task_list(f, rows[2], app, board);
}

fn draw_task_form(
    f: &mut Frame,
    area: Rect,
    title: &str,
    form: &TaskForm,
    focus: Option<FormField>,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(focus_style(focus.is_some()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(inner);

    for (i, field) in FormField::ALL.iter().enumerate() {
        let focused = focus == Some(*field);
        match form.input(*field) {
            Some(input) => draw_input(f, rows[i], field.label(), input, focused, false),
            None => {
                let mut choices = Priority::ALL.to_vec();
                if let Priority::Other(_) = form.priority {
                    choices.push(form.priority.clone());
                }
                let options: Vec<Span> = choices
                    .iter()
                    .map(|p| {
                        let style = if *p == form.priority {
                            Style::default()
                                .fg(priority_color(p))
                                .add_modifier(Modifier::REVERSED)
                        } else {
                            Style::default().fg(priority_color(p))
                        };
                        Span::styled(format!(" {} ", p), style)
                    })
                    .collect();
                let select = Paragraph::new(Line::from(options)).block(
                    Block::default()
                        .title(field.label())
                        .borders(Borders::ALL)
                        .border_style(focus_style(focused)),
                );
                f.render_widget(select, rows[i]);
            }
        }
    }
}

fn draw_filters<A: TaskApi>(f: &mut Frame, area: Rect, app: &App<A>, board: &Board) {
    let block = Block::default().title("Filter & Search").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let counts = board.counts();
    let buttons: Vec<Span> = Filter::ALL
        .iter()
        .map(|filter| {
            let label = format!(" {} ({}) ", filter, counts.of(*filter));
            if *filter == board.filter() {
                Span::styled(label, Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Span::raw(label)
            }
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(buttons)), rows[0]);

    draw_input(
        f,
        rows[1],
        "Search tasks...",
        &app.search_box,
        app.focus == BoardFocus::Search,
        false,
    );

    if board.search_input() != board.active_search() {
        let pending = Paragraph::new("searching...").style(Style::default().fg(Color::DarkGray));
        f.render_widget(pending, rows[2]);
    }
}

fn task_item<'a>(task: &'a Task) -> ListItem<'a> {
    let mut text_style = Style::default().fg(Color::White);
    if task.completed {
        text_style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    let checkbox = if task.completed { "[x] " } else { "[ ] " };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled("▌", Style::default().fg(priority_color(&task.priority))),
            Span::raw(checkbox),
            Span::styled(task.text.as_str(), text_style),
        ]),
        Line::from(Span::styled(
            format!(
                "     Due: {} | Priority: {} | Category: {}",
                task.due_label(),
                task.priority,
                task.category_label()
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn edit_item<'a>(form: &TaskForm, focus: Option<FormField>) -> ListItem<'a> {
    let field_style = |field: FormField| {
        if focus == Some(field) {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::UNDERLINED)
        }
    };

    let mut spans = vec![Span::raw("  ✎ ")];
    for field in FormField::ALL {
        let value = match form.input(field) {
            Some(input) if input.value().is_empty() && field == FormField::Category => {
                "Category".to_string()
            }
            Some(input) => input.value().to_string(),
            None => form.priority.to_string(),
        };
        spans.push(Span::styled(value, field_style(field)));
        spans.push(Span::raw("  "));
    }
    ListItem::new(vec![
        Line::from(spans),
        Line::from(Span::styled(
            "     Enter save | Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn draw_task_list<A: TaskApi>(f: &mut Frame, area: Rect, app: &App<A>, board: &Board) {
    let visible = board.get_visible_tasks();
    let title = format!("Tasks ({})", visible.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(matches!(
            app.focus,
            BoardFocus::List | BoardFocus::Edit(_)
        )));

    if visible.is_empty() {
        let empty = Paragraph::new("No tasks found. Add your first task above!")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let edit_focus = match app.focus {
        BoardFocus::Edit(field) => Some(field),
        _ => None,
    };
    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| match board.editing() {
            Some(edit) if edit.id == task.id => edit_item(&edit.form, edit_focus),
            _ => task_item(task),
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(board.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_toasts<A: TaskApi>(f: &mut Frame, app: &App<A>) {
    let area = f.area();
    let toasts: Vec<_> = app.notes.iter().collect();
    if toasts.is_empty() {
        return;
    }

    let width = 44.min(area.width);
    let height = (toasts.len() as u16 + 2).min(area.height);
    let rect = Rect {
        x: area.right().saturating_sub(width),
        y: area.bottom().saturating_sub(height + 1),
        width,
        height,
    };

    let lines: Vec<Line> = toasts
        .iter()
        .map(|t| {
            let (icon, color) = match t.level {
                Level::Success => ("✔ ", Color::Green),
                Level::Error => ("✖ ", Color::Red),
                Level::Info => ("ℹ ", Color::Blue),
            };
            Line::from(Span::styled(
                format!("{}{}", icon, t.message),
                Style::default().fg(color),
            ))
        })
        .collect();

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        rect,
    );
}
