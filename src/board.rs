use crate::client::TaskApi;
use crate::form::{Debounced, Input};
use crate::notify::Notifier;
use crate::task::{validate_task_form, Priority, Task, TaskDraft, TaskId};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn admits(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(format!(
                "unknown filter '{}' (expected all, active or completed)",
                other
            )),
        }
    }
}

/// Number of tasks behind each filter button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    pub fn of(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Active => self.active,
            Filter::Completed => self.completed,
        }
    }
}

/// Fields of the task form in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Text,
    DueDate,
    Category,
    Priority,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Text,
        FormField::DueDate,
        FormField::Category,
        FormField::Priority,
    ];

    pub fn next(self) -> Self {
        match self {
            FormField::Text => FormField::DueDate,
            FormField::DueDate => FormField::Category,
            FormField::Category => FormField::Priority,
            FormField::Priority => FormField::Text,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Text => FormField::Priority,
            FormField::DueDate => FormField::Text,
            FormField::Category => FormField::DueDate,
            FormField::Priority => FormField::Category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Text => "Task Description",
            FormField::DueDate => "Due Date (YYYY-MM-DD)",
            FormField::Category => "Category",
            FormField::Priority => "Priority",
        }
    }
}

/// Field values shared by the add form and the inline editor.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub text: Input,
    pub due_date: Input,
    pub category: Input,
    pub priority: Priority,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            text: Input::with_value(task.text.clone()),
            due_date: Input::with_value(task.due_date.clone().unwrap_or_default()),
            category: Input::with_value(task.category.clone().unwrap_or_default()),
            priority: task.priority.clone(),
        }
    }

    /// The text input behind a field; priority is a select, not an input.
    pub fn input_mut(&mut self, field: FormField) -> Option<&mut Input> {
        match field {
            FormField::Text => Some(&mut self.text),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Category => Some(&mut self.category),
            FormField::Priority => None,
        }
    }

    pub fn input(&self, field: FormField) -> Option<&Input> {
        match field {
            FormField::Text => Some(&self.text),
            FormField::DueDate => Some(&self.due_date),
            FormField::Category => Some(&self.category),
            FormField::Priority => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_draft(&self, completed: bool) -> TaskDraft {
        TaskDraft {
            completed,
            ..TaskDraft::from_form(
                self.text.value(),
                self.due_date.value(),
                self.priority.clone(),
                self.category.value(),
            )
        }
    }

    /// Runs form validation, reporting the first failure as a toast.
    fn validate(&self, notes: &mut Notifier) -> bool {
        match validate_task_form(self.text.value(), self.due_date.value()) {
            Ok(()) => true,
            Err(e) => {
                notes.error(e.to_string());
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditState {
    pub id: TaskId,
    pub form: TaskForm,
}

/// The logged-in user's tasks plus everything the board view tracks about them.
#[derive(Debug)]
pub struct Board {
    username: String,
    tasks: Vec<Task>,
    loading: bool,
    pub new_task: TaskForm,
    editing: Option<EditState>,
    filter: Filter,
    search: Debounced<String>,
    pub selected: usize,
}

impl Board {
    pub fn new(username: impl Into<String>, search_delay: Duration) -> Self {
        Self {
            username: username.into(),
            tasks: Vec::new(),
            loading: true,
            new_task: TaskForm::default(),
            editing: None,
            filter: Filter::All,
            search: Debounced::new(String::new(), search_delay),
            selected: 0,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replaces the local copy with the backend's list.
    pub fn load(&mut self, api: &impl TaskApi, notes: &mut Notifier) {
        match api.list_tasks(&self.username) {
            Ok(tasks) => {
                tracing::info!(username = %self.username, count = tasks.len(), "tasks loaded");
                self.tasks = tasks;
            }
            Err(e) => {
                tracing::warn!(username = %self.username, error = %e, "failed to load tasks");
                notes.error("Failed to load tasks");
            }
        }
        self.loading = false;
        self.clamp_selection();
    }

    pub fn add_task(&mut self, api: &impl TaskApi, notes: &mut Notifier) -> bool {
        if !self.new_task.validate(notes) {
            return false;
        }
        let draft = self.new_task.to_draft(false);
        match api.create_task(&self.username, &draft) {
            Ok(created) => {
                tracing::info!(id = %created.id, "task created");
                self.tasks.push(created);
                self.new_task.reset();
                notes.success("Task added successfully!");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to create task");
                notes.error("Error adding task");
                false
            }
        }
    }

    pub fn delete_task(&mut self, api: &impl TaskApi, notes: &mut Notifier, id: &TaskId) {
        match api.delete_task(&self.username, id) {
            Ok(()) => {
                tracing::info!(%id, "task deleted");
                self.tasks.retain(|t| &t.id != id);
                if self.editing.as_ref().is_some_and(|e| &e.id == id) {
                    self.editing = None;
                }
                self.clamp_selection();
                notes.success("Task deleted successfully!");
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to delete task");
                notes.error("Error deleting task");
            }
        }
    }

    /// Flips completion on the backend; unknown ids are ignored.
    pub fn toggle_done(&mut self, api: &impl TaskApi, notes: &mut Notifier, id: &TaskId) {
        let Some(task) = self.tasks.iter().find(|t| &t.id == id) else {
            return;
        };
        let mut draft = task.to_draft();
        draft.completed = !task.completed;

        match api.update_task(&self.username, id, &draft) {
            Ok(updated) => {
                self.replace(id, updated);
                self.clamp_selection();
                let state = if draft.completed { "completed" } else { "active" };
                notes.success(format!("Task marked as {}!", state));
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to toggle task");
                notes.error("Error updating task");
            }
        }
    }

    pub fn start_editing(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter().find(|t| &t.id == id) {
            Some(task) => {
                self.editing = Some(EditState {
                    id: task.id.clone(),
                    form: TaskForm::from_task(task),
                });
                true
            }
            None => false,
        }
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditState> {
        self.editing.as_mut()
    }

    /// Sends the edited fields, keeping the task's current completion state.
    pub fn save_edited(&mut self, api: &impl TaskApi, notes: &mut Notifier) -> bool {
        let Some(edit) = self.editing.as_ref() else {
            return false;
        };
        if !edit.form.validate(notes) {
            return false;
        }
        let completed = self
            .tasks
            .iter()
            .find(|t| t.id == edit.id)
            .map(|t| t.completed)
            .unwrap_or(false);
        let draft = edit.form.to_draft(completed);
        let id = edit.id.clone();

        match api.update_task(&self.username, &id, &draft) {
            Ok(updated) => {
                tracing::info!(%id, "task updated");
                self.replace(&id, updated);
                self.editing = None;
                notes.success("Task updated successfully!");
                true
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "failed to save edited task");
                notes.error("Error saving edited task");
                false
            }
        }
    }

    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    fn replace(&mut self, id: &TaskId, updated: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| &t.id == id) {
            *slot = updated;
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.clamp_selection();
    }

    /// What the user typed in the search box.
    pub fn search_input(&self) -> &str {
        self.search.latest()
    }

    /// The term the list is currently filtered by.
    pub fn active_search(&self) -> &str {
        self.search.settled()
    }

    pub fn set_search(&mut self, term: impl Into<String>, now: Instant) {
        self.search.set(term.into(), now);
    }

    /// Advances the search debounce; true when the visible list may have changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let changed = self.search.poll(now);
        if changed {
            self.clamp_selection();
        }
        changed
    }

    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        Counts {
            all: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    pub fn get_visible_tasks(&self) -> Vec<&Task> {
        let term = self.search.settled();
        self.tasks
            .iter()
            .filter(|t| self.filter.admits(t) && t.matches_search(term))
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.get_visible_tasks().get(self.selected).copied()
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        let visible = self.get_visible_tasks().len();
        if self.selected + 1 < visible {
            self.selected += 1;
        }
    }

    fn clamp_selection(&mut self) {
        let visible = self.get_visible_tasks().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }
}
