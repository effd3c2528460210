use chrono::{DateTime, FixedOffset, Local, Utc};
use taskify_shared::CalendarDay;

/// Source of "now" for timestamps and due-date buckets.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    fn calendar_day(&self) -> CalendarDay {
        CalendarDay::new(self.now())
    }
}

/// Wall clock, in the host time zone unless a fixed offset is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }

    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        Self::new(minutes.and_then(|m| FixedOffset::east_opt(m * 60)))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }

    fn calendar_day(&self) -> CalendarDay {
        match self.offset {
            Some(_) => CalendarDay::new(self.now()),
            None => CalendarDay::local(Local::now()),
        }
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use taskify_shared::DayZone;

    #[test]
    fn configured_offset_is_used() {
        let clock = SystemClock::from_offset_minutes(Some(-300));
        assert_eq!(clock.now().offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn system_clock_picks_the_day_zone() {
        let fixed = SystemClock::from_offset_minutes(Some(120));
        assert_eq!(
            fixed.calendar_day().zone(),
            DayZone::Fixed(FixedOffset::east_opt(7200).unwrap())
        );
        assert_eq!(SystemClock::new(None).calendar_day().zone(), DayZone::Local);
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let clock = FixedClock(offset.with_ymd_and_hms(2024, 5, 10, 0, 30, 0).unwrap());
        assert_eq!(
            clock.calendar_day().today(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
        assert_eq!(
            clock.now_utc(),
            Utc.with_ymd_and_hms(2024, 5, 9, 23, 30, 0).unwrap()
        );
    }
}
