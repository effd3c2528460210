use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarDay, DueBucket};
use crate::task::{OwnerId, Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl PriorityCounts {
    fn bump(&mut self, priority: Priority) {
        match priority {
            Priority::Low => self.low += 1,
            Priority::Medium => self.medium += 1,
            Priority::High => self.high += 1,
        }
    }
}

/// Point-in-time counts over one owner's tasks.
///
/// `due_today` counts completed tasks too, so it always agrees with a
/// `status=today` listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub due_today: usize,
    pub overdue: usize,
    pub upcoming: usize,
    pub by_priority: PriorityCounts,
}

impl TaskStats {
    pub fn compute(owner: OwnerId, tasks: &[Task], day: &CalendarDay) -> Self {
        tasks
            .iter()
            .filter(|task| task.owner == owner)
            .fold(Self::default(), |mut stats, task| {
                stats.total += 1;
                if task.completed {
                    stats.completed += 1;
                }
                match day.bucket_of(task) {
                    Some(DueBucket::Today) => stats.due_today += 1,
                    Some(DueBucket::Overdue) => stats.overdue += 1,
                    Some(DueBucket::Upcoming) => stats.upcoming += 1,
                    None => {}
                }
                stats.by_priority.bump(task.priority);
                stats
            })
    }
}
