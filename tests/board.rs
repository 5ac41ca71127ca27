mod common;

use common::{task, FakeApi};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use taskboard::board::{Board, Filter};
use taskboard::form::Input;
use taskboard::notify::{Level, Notifier};
use taskboard::task::{Priority, Task, TaskDraft, TaskId};

fn loaded_board(api: &FakeApi, notes: &mut Notifier) -> Board {
    let mut board = Board::new("ann", Duration::from_millis(1000));
    board.load(api, notes);
    board
}

fn latest(notes: &Notifier) -> (Level, String) {
    let toast = notes.latest().expect("a toast");
    (toast.level, toast.message.clone())
}

#[test]
fn load_replaces_tasks() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false), task(2, "Pay rent", true)]);
    let mut notes = Notifier::new(Duration::from_secs(3));

    let board = loaded_board(&api, &mut notes);

    assert!(!board.is_loading());
    assert_eq!(board.tasks().len(), 2);
    assert!(notes.is_empty());
}

#[test]
fn load_failure_shows_toast_and_stops_loading() {
    let api = FakeApi::new();
    api.disconnect();
    let mut notes = Notifier::new(Duration::from_secs(3));

    let board = loaded_board(&api, &mut notes);

    assert!(!board.is_loading());
    assert!(board.tasks().is_empty());
    assert_eq!(latest(&notes), (Level::Error, "Failed to load tasks".to_string()));
}

#[test]
fn add_task_rejects_short_text_without_calling_backend() {
    let api = FakeApi::new();
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);

    board.new_task.text = Input::with_value("ab");
    assert!(!board.add_task(&api, &mut notes));
    assert_eq!(
        latest(&notes),
        (Level::Error, "Task text must be at least 3 characters".to_string())
    );

    board.new_task.text = Input::with_value("   ");
    assert!(!board.add_task(&api, &mut notes));
    assert_eq!(latest(&notes), (Level::Error, "Please add task text".to_string()));

    board.new_task.text = Input::with_value("Buy milk");
    board.new_task.due_date = Input::with_value("tomorrow");
    assert!(!board.add_task(&api, &mut notes));
    assert_eq!(latest(&notes), (Level::Error, "Invalid due date".to_string()));

    assert!(api.created.borrow().is_empty());
}

#[test]
fn add_task_appends_created_task_and_resets_form() {
    let api = FakeApi::new();
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);

    board.new_task.text = Input::with_value("Water plants");
    board.new_task.due_date = Input::with_value("2024-06-01");
    board.new_task.category = Input::with_value("home");
    board.new_task.priority = Priority::High;

    assert!(board.add_task(&api, &mut notes));

    assert_eq!(
        api.created.borrow()[0],
        (
            "ann".to_string(),
            TaskDraft {
                text: "Water plants".to_string(),
                completed: false,
                due_date: Some("2024-06-01".to_string()),
                priority: Priority::High,
                category: "home".to_string(),
            }
        )
    );
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.tasks()[0].id, TaskId::Number(100));
    assert_eq!(board.new_task.text.value(), "");
    assert_eq!(board.new_task.priority, Priority::Medium);
    assert_eq!(latest(&notes), (Level::Success, "Task added successfully!".to_string()));
}

#[test]
fn add_task_backend_error_keeps_form() {
    let api = FakeApi::new();
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);
    api.disconnect();

    board.new_task.text = Input::with_value("Water plants");
    assert!(!board.add_task(&api, &mut notes));

    assert_eq!(board.new_task.text.value(), "Water plants");
    assert_eq!(latest(&notes), (Level::Error, "Error adding task".to_string()));
}

#[test]
fn toggle_flips_completion() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);
    let id = TaskId::Number(1);

    board.toggle_done(&api, &mut notes, &id);
    assert!(board.tasks()[0].completed);
    assert_eq!(
        latest(&notes),
        (Level::Success, "Task marked as completed!".to_string())
    );

    board.toggle_done(&api, &mut notes, &id);
    assert!(!board.tasks()[0].completed);
    assert_eq!(latest(&notes), (Level::Success, "Task marked as active!".to_string()));

    let updated = api.updated.borrow();
    assert_eq!(updated.len(), 2);
    assert!(updated[0].2.completed);
    assert_eq!(updated[0].2.category, "");
}

#[test]
fn toggle_unknown_id_is_a_no_op() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);

    board.toggle_done(&api, &mut notes, &TaskId::Number(42));

    assert!(api.updated.borrow().is_empty());
    assert!(notes.is_empty());
}

#[test]
fn toggle_sends_unknown_priority_back_unchanged() {
    let stored: Task = serde_json::from_str(
        r#"{"id":1,"text":"Ship release","completed":false,"priority":"urgent"}"#,
    )
    .unwrap();
    let api = FakeApi::with_tasks(vec![stored]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);

    board.toggle_done(&api, &mut notes, &TaskId::Number(1));

    let updated = api.updated.borrow();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].2.priority, Priority::Other("urgent".to_string()));
    let body = serde_json::to_value(&updated[0].2).unwrap();
    assert_eq!(body["priority"], "urgent");
    assert_eq!(board.tasks()[0].priority.as_str(), "urgent");
}

#[test]
fn toggle_failure_leaves_task_untouched() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);
    api.disconnect();

    board.toggle_done(&api, &mut notes, &TaskId::Number(1));

    assert!(!board.tasks()[0].completed);
    assert_eq!(latest(&notes), (Level::Error, "Error updating task".to_string()));
}

#[test]
fn delete_removes_task() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false), task(2, "Pay rent", false)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);
    board.selected = 1;

    board.delete_task(&api, &mut notes, &TaskId::Number(2));

    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.selected, 0);
    assert_eq!(
        api.deleted.borrow()[0],
        ("ann".to_string(), TaskId::Number(2))
    );
    assert_eq!(latest(&notes), (Level::Success, "Task deleted successfully!".to_string()));
}

#[test]
fn delete_failure_shows_error() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);
    api.disconnect();

    board.delete_task(&api, &mut notes, &TaskId::Number(1));

    assert_eq!(board.tasks().len(), 1);
    assert_eq!(latest(&notes), (Level::Error, "Error deleting task".to_string()));
}

#[test]
fn save_edited_keeps_completion_and_clears_edit_state() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", true)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);

    assert!(board.start_editing(&TaskId::Number(1)));
    {
        let edit = board.editing_mut().unwrap();
        edit.form.text = Input::with_value("Buy oat milk");
        edit.form.priority = Priority::Low;
        edit.form.category = Input::with_value("shopping");
    }
    assert!(board.save_edited(&api, &mut notes));

    let task = &board.tasks()[0];
    assert_eq!(task.text, "Buy oat milk");
    assert!(task.completed);
    assert_eq!(task.priority, Priority::Low);
    assert_eq!(task.category.as_deref(), Some("shopping"));
    assert!(board.editing().is_none());
    assert_eq!(latest(&notes), (Level::Success, "Task updated successfully!".to_string()));
}

#[test]
fn save_edited_validates_and_keeps_editing_on_error() {
    let api = FakeApi::with_tasks(vec![task(1, "Buy milk", false)]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);

    board.start_editing(&TaskId::Number(1));
    board.editing_mut().unwrap().form.text = Input::with_value("no");
    assert!(!board.save_edited(&api, &mut notes));
    assert!(board.editing().is_some());
    assert!(api.updated.borrow().is_empty());

    board.editing_mut().unwrap().form.text = Input::with_value("Buy bread");
    api.disconnect();
    assert!(!board.save_edited(&api, &mut notes));
    assert!(board.editing().is_some());
    assert_eq!(latest(&notes), (Level::Error, "Error saving edited task".to_string()));
}

#[test]
fn filter_and_debounced_search_combine() {
    let api = FakeApi::with_tasks(vec![
        task(1, "Buy milk", false),
        task(2, "Buy stamps", true),
        task(3, "Pay rent", false),
    ]);
    let mut notes = Notifier::new(Duration::from_secs(3));
    let mut board = loaded_board(&api, &mut notes);
    let start = Instant::now();

    board.set_filter(Filter::Active);
    board.set_search("BUY", start);
    assert_eq!(board.get_visible_tasks().len(), 2);

    board.tick(start + Duration::from_millis(999));
    assert_eq!(board.get_visible_tasks().len(), 2);

    board.tick(start + Duration::from_millis(1000));
    let visible: Vec<_> = board.get_visible_tasks().iter().map(|t| t.id.clone()).collect();
    assert_eq!(visible, vec![TaskId::Number(1)]);
}
