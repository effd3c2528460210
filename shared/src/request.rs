//! Request bodies for the task endpoints and their validation.
//!
//! Each body deserializes leniently (every field optional) and is then
//! validated into a typed value the service layer can apply without further
//! checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::task::{normalize_tags, OwnerId, Priority, Subtask, Task};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub subtasks: Option<Vec<NewSubtask>>,
}

/// Subtask submitted inline with a new task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSubtask {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl NewSubtask {
    pub fn into_subtask(self) -> ValidationResult<Subtask> {
        let mut subtask = Subtask::new(required_text("subtask title", self.title)?);
        subtask.completed = self.completed.unwrap_or(false);
        Ok(subtask)
    }
}

impl CreateTaskRequest {
    /// Build the task this request describes, applying defaults for omitted fields.
    pub fn into_task(self, owner: OwnerId, now: DateTime<Utc>) -> ValidationResult<Task> {
        let title = required_text("title", self.title)?;
        let subtasks = self
            .subtasks
            .unwrap_or_default()
            .into_iter()
            .map(NewSubtask::into_subtask)
            .collect::<ValidationResult<Vec<_>>>()?;
        let mut task = Task::new(owner, title, now);
        task.subtasks = subtasks;
        task.description = self.description;
        task.priority = self.priority.unwrap_or_default();
        task.due_date = self.due_date;
        task.tags = normalize_tags(self.tags.unwrap_or_default());
        task.category = self.category.and_then(trimmed);
        task.set_completed(self.completed.unwrap_or(false), now);
        Ok(task)
    }
}

/// Partial update. For nullable fields the outer `Option` tells "absent"
/// apart from an explicit `null`, which clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
}

impl UpdateTaskRequest {
    /// Validate first, then merge onto `task`; a rejected request leaves it untouched.
    pub fn apply_to(self, task: &mut Task, now: DateTime<Utc>) -> ValidationResult<()> {
        let title = self
            .title
            .map(|title| required_text("title", Some(title)))
            .transpose()?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = self.tags {
            task.tags = normalize_tags(tags);
        }
        if let Some(category) = self.category {
            task.category = category.and_then(trimmed);
        }
        if let Some(completed) = self.completed {
            task.set_completed(completed, now);
        }
        task.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddSubtaskRequest {
    pub title: Option<String>,
}

impl AddSubtaskRequest {
    pub fn into_subtask(self) -> ValidationResult<Subtask> {
        required_text("title", self.title).map(Subtask::new)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubtaskRequest {
    pub completed: Option<bool>,
}

impl UpdateSubtaskRequest {
    pub fn completed(&self) -> ValidationResult<bool> {
        self.completed
            .ok_or(ValidationError::Required { field: "completed" })
    }
}

fn required_text(field: &'static str, value: Option<String>) -> ValidationResult<String> {
    let raw = value.ok_or(ValidationError::Required { field })?;
    trimmed(raw).ok_or(ValidationError::Empty { field })
}

fn trimmed(raw: String) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Maps a present field to `Some(value)`, including `Some(None)` for `null`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
