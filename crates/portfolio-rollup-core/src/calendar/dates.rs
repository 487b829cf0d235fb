use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DateRangeError, RollupError};
use crate::RollupResult;

/// Textual form of every date accepted or emitted by the engine.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive span of calendar days.
///
/// Dates are `NaiveDate`s: they carry no time-of-day, so day counts are
/// unaffected by daylight-saving shifts in the local calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// January 1 through December 31 of `year`, if the year is representable.
    pub fn full_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Inclusive day count; zero for an inverted range.
    pub fn days(&self) -> i64 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    /// The shared inclusive span of two ranges, if any.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start > end {
            None
        } else {
            Some(DateRange { start, end })
        }
    }
}

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// The parsed date must format back to the same text, so rolled-over or
/// loosely padded inputs ("2024-02-30", "2024-2-3") are rejected.
pub fn normalize(input: &str) -> RollupResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RollupError::DateError("date is empty".to_string()));
    }

    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|e| RollupError::DateError(format!("'{trimmed}' is not a valid date: {e}")))?;

    if date.format(DATE_FORMAT).to_string() != trimmed {
        return Err(RollupError::DateError(format!(
            "'{trimmed}' does not round-trip as YYYY-MM-DD"
        )));
    }

    Ok(date)
}

/// Normalize both endpoints and check their order.
pub fn parse_range(start: &str, end: &str) -> Result<DateRange, DateRangeError> {
    let (Ok(start), Ok(end)) = (normalize(start), normalize(end)) else {
        return Err(DateRangeError::Missing);
    };
    if start > end {
        return Err(DateRangeError::Inverted);
    }
    Ok(DateRange { start, end })
}

/// The diagnostic for a textual range, or `None` when it can be allocated.
pub fn validate(start: &str, end: &str) -> Option<DateRangeError> {
    parse_range(start, end).err()
}

/// Clamp a date into `[min, max]`.
pub(crate) fn clamp_date(date: NaiveDate, min: NaiveDate, max: NaiveDate) -> NaiveDate {
    if date < min {
        min
    } else if date > max {
        max
    } else {
        date
    }
}

/// Pull both endpoints into `year`, collapsing to a single day if the clamped
/// start ends up after the clamped end.
///
/// Years outside the representable calendar leave the range untouched.
pub fn clamp_to_year(range: DateRange, year: i32) -> DateRange {
    let Some(bounds) = DateRange::full_year(year) else {
        return range;
    };
    let start = clamp_date(range.start, bounds.start, bounds.end);
    let mut end = clamp_date(range.end, bounds.start, bounds.end);
    if start > end {
        end = start;
    }
    DateRange { start, end }
}
