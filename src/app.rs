//! Screen routing and key handling.

use crate::auth::{LoginScreen, SignupScreen};
use crate::board::{Board, Filter, FormField};
use crate::client::TaskApi;
use crate::config::UiConfig;
use crate::form::Input;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Signup,
    Login,
    Board,
}

/// Which part of the board receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFocus {
    #[default]
    List,
    NewTask(FormField),
    Edit(FormField),
    Search,
}

pub struct App<A> {
    api: A,
    session: SessionStore,
    ui: UiConfig,
    route: Route,
    pub signup: SignupScreen,
    pub login: LoginScreen,
    board: Option<Board>,
    pub focus: BoardFocus,
    pub search_box: Input,
    pub notes: Notifier,
    redirect: Option<(Route, Instant)>,
    quit: bool,
}

impl<A: TaskApi> App<A> {
    pub fn new(api: A, session: SessionStore, ui: UiConfig) -> Self {
        let notes = Notifier::new(ui.toast_ttl());
        Self {
            api,
            session,
            ui,
            route: Route::Signup,
            signup: SignupScreen::default(),
            login: LoginScreen::default(),
            board: None,
            focus: BoardFocus::List,
            search_box: Input::default(),
            notes,
            redirect: None,
            quit: false,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn board_mut(&mut self) -> Option<&mut Board> {
        self.board.as_mut()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn pending_redirect(&self) -> Option<Route> {
        self.redirect.map(|(route, _)| route)
    }

    /// Switches screens. Entering signup or login starts from an empty form.
    /// The board requires a stored username and falls back to the login
    /// screen without one.
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(?route, "navigate");
        self.redirect = None;
        if route != self.route {
            match route {
                Route::Signup => self.signup = SignupScreen::default(),
                Route::Login => self.login = LoginScreen::default(),
                Route::Board => {}
            }
        }
        if route != Route::Board {
            self.route = route;
            return;
        }

        match self.session.username() {
            Ok(Some(username)) => {
                self.board = Some(Board::new(username, self.ui.search_debounce()));
                self.focus = BoardFocus::List;
                self.search_box.clear();
                self.route = Route::Board;
            }
            Ok(None) => self.route = Route::Login,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session");
                self.route = Route::Login;
            }
        }
    }

    /// Time-driven work: toast expiry, delayed navigation, the initial task
    /// load and the search debounce.
    pub fn tick(&mut self, now: Instant) {
        self.notes.prune(now);

        if let Some((route, due)) = self.redirect {
            if now >= due {
                self.navigate(route);
            }
        }

        if self.route != Route::Board {
            return;
        }
        if let Some(board) = self.board.as_mut() {
            if board.is_loading() {
                board.load(&self.api, &mut self.notes);
            }
            board.tick(now);
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            tracing::warn!(error = %e, "could not clear session");
        }
        self.board = None;
        self.navigate(Route::Login);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }

        match self.route {
            Route::Signup => self.handle_signup_key(key),
            Route::Login => self.handle_login_key(key),
            Route::Board => self.handle_board_key(key),
        }
    }

    fn handle_signup_key(&mut self, key: KeyEvent) {
        let form = &mut self.signup.form;
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::F(2) => self.navigate(Route::Login),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focus = form.focus.toggle()
            }
            KeyCode::Enter => {
                if self.signup.submit(&self.api, &mut self.notes) {
                    let due = Instant::now() + self.ui.signup_redirect();
                    self.redirect = Some((Route::Login, due));
                }
            }
            _ => {
                edit_input(form.focused_mut(), key);
            }
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        let form = &mut self.login.form;
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::F(2) => self.navigate(Route::Signup),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                form.focus = form.focus.toggle()
            }
            KeyCode::Enter => {
                let Some(username) = self.login.submit(&self.api) else {
                    return;
                };
                match self.session.store(&username) {
                    Ok(()) => {
                        self.login = LoginScreen::default();
                        self.navigate(Route::Board);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "could not store session");
                        self.login.error = Some("Login failed".to_string());
                    }
                }
            }
            _ => {
                edit_input(form.focused_mut(), key);
            }
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match self.focus {
            BoardFocus::List => self.handle_list_key(key),
            BoardFocus::NewTask(field) => self.handle_new_task_key(field, key),
            BoardFocus::Edit(field) => self.handle_edit_key(field, key),
            BoardFocus::Search => self.handle_search_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char('l') = key.code {
            self.logout();
            return;
        }
        let Some(board) = self.board.as_mut() else {
            return;
        };
        if board.is_loading() {
            if key.code == KeyCode::Char('q') {
                self.quit = true;
            }
            return;
        }

        let selected = board.selected_task().map(|t| t.id.clone());
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Up | KeyCode::Char('k') => board.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => board.select_next(),
            KeyCode::Char(' ') => {
                if let Some(id) = selected {
                    board.toggle_done(&self.api, &mut self.notes, &id);
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(id) = selected {
                    if board.start_editing(&id) {
                        self.focus = BoardFocus::Edit(FormField::Text);
                    }
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(id) = selected {
                    board.delete_task(&self.api, &mut self.notes, &id);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.focus = BoardFocus::NewTask(FormField::Text)
            }
            KeyCode::Char('/') => self.focus = BoardFocus::Search,
            KeyCode::Char('f') => board.set_filter(board.filter().next()),
            KeyCode::Char('1') => board.set_filter(Filter::All),
            KeyCode::Char('2') => board.set_filter(Filter::Active),
            KeyCode::Char('3') => board.set_filter(Filter::Completed),
            KeyCode::Char('r') => board.load(&self.api, &mut self.notes),
            _ => {}
        }
    }

    fn handle_new_task_key(&mut self, field: FormField, key: KeyEvent) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.focus = BoardFocus::List,
            KeyCode::Tab => self.focus = BoardFocus::NewTask(field.next()),
            KeyCode::BackTab => self.focus = BoardFocus::NewTask(field.prev()),
            KeyCode::Enter => {
                if board.add_task(&self.api, &mut self.notes) {
                    self.focus = BoardFocus::NewTask(FormField::Text);
                }
            }
            _ => edit_form_field(&mut board.new_task, field, key),
        }
    }

    fn handle_edit_key(&mut self, field: FormField, key: KeyEvent) {
        let Some(board) = self.board.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                board.cancel_editing();
                self.focus = BoardFocus::List;
            }
            KeyCode::Tab => self.focus = BoardFocus::Edit(field.next()),
            KeyCode::BackTab => self.focus = BoardFocus::Edit(field.prev()),
            KeyCode::Enter => {
                if board.save_edited(&self.api, &mut self.notes) {
                    self.focus = BoardFocus::List;
                }
            }
            _ => {
                if let Some(edit) = board.editing_mut() {
                    edit_form_field(&mut edit.form, field, key);
                } else {
                    self.focus = BoardFocus::List;
                }
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.focus = BoardFocus::List,
            _ => {
                if edit_input(&mut self.search_box, key) {
                    if let Some(board) = self.board.as_mut() {
                        board.set_search(self.search_box.value(), Instant::now());
                    }
                }
            }
        }
    }
}

fn edit_form_field(form: &mut crate::board::TaskForm, field: FormField, key: KeyEvent) {
    match form.input_mut(field) {
        Some(input) => {
            edit_input(input, key);
        }
        None => match key.code {
            KeyCode::Left | KeyCode::Up => form.priority = form.priority.prev(),
            KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => {
                form.priority = form.priority.next()
            }
            _ => {}
        },
    }
}

/// Applies a line-editing key; true when the value changed.
fn edit_input(input: &mut Input, key: KeyEvent) -> bool {
    let before = input.value().len();
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.insert(c);
            true
        }
        KeyCode::Backspace => {
            input.backspace();
            input.value().len() != before
        }
        KeyCode::Delete => {
            input.delete();
            input.value().len() != before
        }
        KeyCode::Left => {
            input.left();
            false
        }
        KeyCode::Right => {
            input.right();
            false
        }
        KeyCode::Home => {
            input.home();
            false
        }
        KeyCode::End => {
            input.end();
            false
        }
        _ => false,
    }
}
