use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

use crate::task::Task;

/// Time zone in which calendar days are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayZone {
    Fixed(FixedOffset),
    /// Host zone. Each instant gets the offset in force at that instant,
    /// so due dates across a DST change land on the right day.
    Local,
}

/// The current calendar day in a [`DayZone`].
///
/// Due dates are stored as UTC instants; bucketing converts them into the
/// zone before comparing days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    today: NaiveDate,
    zone: DayZone,
}

impl CalendarDay {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            today: now.date_naive(),
            zone: DayZone::Fixed(*now.offset()),
        }
    }

    pub fn local(now: DateTime<Local>) -> Self {
        Self {
            today: now.date_naive(),
            zone: DayZone::Local,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn zone(&self) -> DayZone {
        self.zone
    }

    /// Calendar day of a UTC instant in this zone.
    pub fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self.zone {
            DayZone::Fixed(offset) => instant.with_timezone(&offset).date_naive(),
            DayZone::Local => instant.with_timezone(&Local).date_naive(),
        }
    }

    /// Bucket a task falls into, if any. Undated tasks never have one.
    pub fn bucket_of(&self, task: &Task) -> Option<DueBucket> {
        let due = self.day_of(task.due_date.as_ref()?);
        if due == self.today {
            Some(DueBucket::Today)
        } else if due > self.today {
            Some(DueBucket::Upcoming)
        } else if !task.completed {
            Some(DueBucket::Overdue)
        } else {
            None
        }
    }
}

/// Due-date classification shared by filtering and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DueBucket {
    Today,
    Upcoming,
    /// Due before today and still open.
    Overdue,
}

impl DueBucket {
    pub fn matches(self, day: &CalendarDay, task: &Task) -> bool {
        day.bucket_of(task) == Some(self)
    }
}
