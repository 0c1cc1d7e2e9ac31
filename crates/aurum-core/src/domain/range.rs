use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{CalendarDate, ValidationError};

/// Inclusive span of calendar days with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(CalendarDate::parse(start)?, CalendarDate::parse(end)?)
    }

    pub const fn single_day(day: CalendarDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub const fn start(&self) -> CalendarDate {
        self.start
    }

    pub const fn end(&self) -> CalendarDate {
        self.end
    }

    /// `end - start` in whole days; zero for a single-day range.
    pub fn span_days(&self) -> i64 {
        self.start.days_until(self.end)
    }

    pub fn day_count(&self) -> i64 {
        self.span_days() + 1
    }

    pub fn contains(&self, day: CalendarDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Deserialize)]
struct RawDateRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawDateRange::deserialize(deserializer)?;
        Self::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}
