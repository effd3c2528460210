//! Task query engine: filter criteria, their lenient parsing from query
//! strings, and the ordered evaluation over one owner's tasks.

use std::cmp::Ordering;

use crate::calendar::{CalendarDay, DueBucket};
use crate::task::{OwnerId, Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
}

impl SortField {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            "dueDate" | "due_date" => Some(Self::DueDate),
            "priority" => Some(Self::Priority),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Raw query-string parameters, exactly as a client sends them.
///
/// Every field is a plain string so that unknown values can be ignored
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub completed: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl TaskQuery {
    /// Collect decoded `key=value` pairs. `dueDate` is an alias of `status`
    /// and `tags` of `tag`. When a parameter repeats, the first non-blank
    /// value wins; unknown keys are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "status" | "dueDate" => &mut query.status,
                "priority" => &mut query.priority,
                "category" => &mut query.category,
                "tag" | "tags" => &mut query.tag,
                "completed" => &mut query.completed,
                "search" => &mut query.search,
                "sortBy" => &mut query.sort_by,
                "sortOrder" => &mut query.sort_order,
                _ => continue,
            };
            if slot.is_none() {
                *slot = non_blank(Some(value.into()));
            }
        }
        query
    }
}

/// Normalized constraints for one task listing. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub bucket: Option<DueBucket>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub completed: Option<bool>,
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bucket(mut self, bucket: DueBucket) -> Self {
        self.bucket = Some(bucket);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(Some(category.into()));
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = non_blank(Some(tag.into()));
        self
    }

    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Search text is stored lowercased; whitespace-only input clears it.
    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = non_blank(Some(text.into())).map(|s| s.to_lowercase());
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    /// Whether a single task satisfies every constraint except ownership.
    pub fn matches(&self, task: &Task, day: &CalendarDay) -> bool {
        if let Some(bucket) = self.bucket {
            if !bucket.matches(day, task) {
                return false;
            }
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        if let Some(category) = &self.category {
            let same = task
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !same {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !task.has_tag(tag) {
                return false;
            }
        }
        if self.completed.is_some_and(|c| c != task.completed) {
            return false;
        }
        if let Some(needle) = &self.search {
            let in_title = task.title.to_lowercase().contains(needle.as_str());
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle.as_str()));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }

    /// Filter and order `tasks`, keeping only those owned by `owner`.
    ///
    /// `tasks` must be in insertion order; the sort is stable, so equal keys
    /// keep that order in both directions.
    pub fn apply(&self, owner: OwnerId, tasks: &[Task], day: &CalendarDay) -> Vec<Task> {
        let mut matched: Vec<Task> = tasks
            .iter()
            .filter(|task| task.owner == owner && self.matches(task, day))
            .cloned()
            .collect();
        matched.sort_by(|a, b| self.compare(a, b));
        matched
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let directed = |ord: Ordering| match self.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        };
        match self.sort_by {
            SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
            SortField::UpdatedAt => directed(a.updated_at.cmp(&b.updated_at)),
            SortField::Priority => directed(a.priority.cmp(&b.priority)),
            SortField::Title => directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            // Undated tasks go last regardless of direction.
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl From<TaskQuery> for FilterCriteria {
    fn from(query: TaskQuery) -> Self {
        let bucket = query.status.as_deref().and_then(parse_bucket);
        Self {
            bucket,
            priority: query.priority.as_deref().and_then(Priority::parse),
            category: non_blank(query.category),
            tag: non_blank(query.tag),
            completed: query.completed.as_deref().and_then(parse_flag),
            search: non_blank(query.search).map(|s| s.to_lowercase()),
            sort_by: query
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            sort_order: query
                .sort_order
                .as_deref()
                .and_then(SortOrder::parse)
                .unwrap_or_default(),
        }
    }
}

/// `all` and anything unrecognized mean no bucket constraint.
fn parse_bucket(token: &str) -> Option<DueBucket> {
    match token.trim().to_ascii_lowercase().as_str() {
        "today" => Some(DueBucket::Today),
        "upcoming" => Some(DueBucket::Upcoming),
        "overdue" => Some(DueBucket::Overdue),
        _ => None,
    }
}

fn parse_flag(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
