use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum number of characters a task text must have once trimmed.
pub const MIN_TEXT_LEN: usize = 3;

/// Server-assigned task identifier. Backends hand out either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

/// Task priority. Values other than low/medium/high are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Maps a wire value; blank means medium, unknown text is preserved.
    pub fn from_wire(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Priority::Medium;
        }
        raw.parse().unwrap_or_else(|_| Priority::Other(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Other(raw) => raw,
        }
    }

    /// Next priority in select order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High | Priority::Other(_) => Priority::Low,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Priority::Low | Priority::Other(_) => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Priority::from_wire(&raw))
    }
}

// Missing or null priorities fall back to medium.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Priority::from_wire).unwrap_or_default())
}

/// A task as the backend returns it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
}

impl Task {
    /// Body for a PUT that keeps every field of this task as is.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            text: self.text.clone(),
            completed: self.completed,
            due_date: self.due_date.clone().filter(|d| !d.is_empty()),
            priority: self.priority.clone(),
            category: self.category.clone().unwrap_or_default(),
        }
    }

    pub fn due_label(&self) -> &str {
        match self.due_date.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "No date",
        }
    }

    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => "None",
        }
    }

    pub fn matches_search(&self, term: &str) -> bool {
        self.text.to_lowercase().contains(&term.to_lowercase())
    }
}

/// Request body for creating or replacing a task.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub text: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub priority: Priority,
    pub category: String,
}

impl TaskDraft {
    /// Builds a draft from raw form values; an empty due date is sent as null.
    pub fn from_form(text: &str, due_date: &str, priority: Priority, category: &str) -> Self {
        Self {
            text: text.to_string(),
            completed: false,
            due_date: Some(due_date.trim().to_string()).filter(|d| !d.is_empty()),
            priority,
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add task text")]
    EmptyText,

    #[error("Task text must be at least 3 characters")]
    TextTooShort,

    #[error("Invalid due date")]
    InvalidDueDate,
}

/// Form-level checks applied before any task is sent to the backend.
pub fn validate_task_form(text: &str, due_date: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if trimmed.chars().count() < MIN_TEXT_LEN {
        return Err(ValidationError::TextTooShort);
    }
    let due_date = due_date.trim();
    if !due_date.is_empty() && parse_due_date(due_date).is_none() {
        return Err(ValidationError::InvalidDueDate);
    }
    Ok(())
}

/// Accepts plain dates, RFC 3339 timestamps and minute/second precision local datetimes.
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_rejects_blank_text() {
        assert_eq!(validate_task_form("   ", ""), Err(ValidationError::EmptyText));
        assert_eq!(validate_task_form("", "2024-01-01"), Err(ValidationError::EmptyText));
    }

    #[test]
    fn test_validate_rejects_short_text() {
        assert_eq!(validate_task_form(" ab ", ""), Err(ValidationError::TextTooShort));
        assert!(validate_task_form("abc", "").is_ok());
    }

    #[test]
    fn test_validate_due_date() {
        assert!(validate_task_form("Buy milk", "2024-02-29").is_ok());
        assert!(validate_task_form("Buy milk", "2024-03-01T10:30").is_ok());
        assert!(validate_task_form("Buy milk", "2024-03-01T10:30:00Z").is_ok());
        assert_eq!(
            validate_task_form("Buy milk", "next tuesday"),
            Err(ValidationError::InvalidDueDate)
        );
        assert_eq!(
            validate_task_form("Buy milk", "2023-02-30"),
            Err(ValidationError::InvalidDueDate)
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::EmptyText.to_string(), "Please add task text");
        assert_eq!(
            ValidationError::TextTooShort.to_string(),
            "Task text must be at least 3 characters"
        );
    }

    #[test]
    fn test_task_deserializes_loose_backend_shapes() {
        let task: Task = serde_json::from_str(
            r#"{"id": 7, "text": "Walk dog", "completed": true, "dueDate": null, "priority": "urgent"}"#,
        )
        .unwrap();
        assert_eq!(task.id, TaskId::Number(7));
        assert_eq!(task.priority, Priority::Other("urgent".to_string()));
        assert_eq!(task.due_label(), "No date");
        assert_eq!(task.category_label(), "None");

        let task: Task =
            serde_json::from_str(r#"{"id": "a1b2", "text": "Read", "priority": "HIGH"}"#).unwrap();
        assert_eq!(task.id.to_string(), "a1b2");
        assert_eq!(task.priority, Priority::High);
        assert!(!task.completed);
    }

    #[test]
    fn test_draft_wire_shape() {
        let draft = TaskDraft::from_form("Pay rent", "", Priority::High, "home");
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "text": "Pay rent",
                "completed": false,
                "dueDate": null,
                "priority": "high",
                "category": "home"
            })
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let task = Task {
            id: TaskId::Number(1),
            text: "Call Mom".to_string(),
            completed: false,
            due_date: None,
            priority: Priority::Low,
            category: None,
        };
        assert!(task.matches_search("mom"));
        assert!(task.matches_search(""));
        assert!(!task.matches_search("dad"));
    }

    #[test]
    fn test_unknown_priority_round_trips() {
        let task: Task =
            serde_json::from_str(r#"{"id": 3, "text": "Ship release", "priority": "urgent"}"#)
                .unwrap();
        let body = serde_json::to_value(task.to_draft()).unwrap();
        assert_eq!(body["priority"], "urgent");

        let task: Task =
            serde_json::from_str(r#"{"id": 4, "text": "Ship release", "priority": ""}"#).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        let task: Task =
            serde_json::from_str(r#"{"id": 5, "text": "Ship release", "priority": null}"#).unwrap();
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_priority_cycle() {
        assert_eq!(Priority::High.next(), Priority::Low);
        assert_eq!(Priority::Low.prev(), Priority::High);
        assert_eq!("Medium".parse::<Priority>(), Ok(Priority::Medium));
        assert_eq!(Priority::Other("urgent".to_string()).next(), Priority::Low);
    }
}
