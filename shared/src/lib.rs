//! Task domain shared by the Taskify server and its clients: the task
//! document, request validation, the filter engine and statistics.

pub mod calendar;
pub mod filter;
pub mod request;
pub mod response;
pub mod stats;
pub mod task;

pub use calendar::{CalendarDay, DayZone, DueBucket};
pub use filter::{FilterCriteria, SortField, SortOrder, TaskQuery};
pub use request::{
    AddSubtaskRequest, CreateTaskRequest, NewSubtask, UpdateSubtaskRequest, UpdateTaskRequest,
    ValidationError, ValidationResult,
};
pub use response::{MessageEnvelope, StatsEnvelope, TaskEnvelope, TaskListEnvelope};
pub use stats::{PriorityCounts, TaskStats};
pub use task::{normalize_tags, OwnerId, Priority, Subtask, Task, IMPORTANT_TAG};
