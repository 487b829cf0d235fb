use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::dates::DateRange;
use crate::error::RollupError;

/// Allocation period size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Twelve calendar months.
    #[default]
    Month,
    /// Fixed 7-day weeks counted from January 1.
    Week,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Month => write!(f, "month"),
            Granularity::Week => write!(f, "week"),
        }
    }
}

impl FromStr for Granularity {
    type Err = RollupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" => Ok(Granularity::Month),
            "week" | "weekly" => Ok(Granularity::Week),
            other => Err(RollupError::InvalidInput {
                field: "granularity".to_string(),
                reason: format!("'{other}' is not one of: month, week"),
            }),
        }
    }
}

/// One allocation period of a year.
///
/// `index` is display order only: 0-based for months, 1-based for weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarBucket {
    pub index: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

impl CalendarBucket {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    /// Nominal length in days, including any overhang past December 31.
    pub fn days(&self) -> i64 {
        self.range().days()
    }
}

/// Build the ordered bucket sequence for `year`.
///
/// Buckets are contiguous and start on January 1. In week mode the final
/// bucket keeps its full 7-day span even when that runs into the next year.
/// Years the calendar cannot represent produce no buckets.
pub fn build_buckets(year: i32, granularity: Granularity) -> Vec<CalendarBucket> {
    let Some(bounds) = DateRange::full_year(year) else {
        tracing::debug!(year, "year outside the representable calendar; no buckets");
        return Vec::new();
    };

    let buckets = match granularity {
        Granularity::Month => month_buckets(year),
        Granularity::Week => week_buckets(bounds),
    };

    tracing::debug!(year, %granularity, count = buckets.len(), "built calendar buckets");
    buckets
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => first_next.pred_opt(),
        // December of the last representable year.
        None => NaiveDate::from_ymd_opt(year, month, 31),
    }
}

fn month_buckets(year: i32) -> Vec<CalendarBucket> {
    (1..=12u32)
        .filter_map(|month| {
            let start = NaiveDate::from_ymd_opt(year, month, 1)?;
            let end = last_day_of_month(year, month)?;
            Some(CalendarBucket {
                index: start.month0(),
                start,
                end,
                label: start.format("%b").to_string(),
            })
        })
        .collect()
}

fn week_buckets(bounds: DateRange) -> Vec<CalendarBucket> {
    let mut buckets = Vec::with_capacity(53);
    let mut start = bounds.start;
    let mut index = 1u32;

    while start <= bounds.end {
        let end = start
            .checked_add_signed(Duration::days(6))
            .unwrap_or(NaiveDate::MAX);
        buckets.push(CalendarBucket {
            index,
            start,
            end,
            label: format!("W{index}"),
        });
        match end.succ_opt() {
            Some(next) => start = next,
            None => break,
        }
        index += 1;
    }

    buckets
}

/// Memoizes bucket sequences by `(year, granularity)`.
///
/// The sequence is identical for every project in a rollup, so callers that
/// recompute on each edit can keep one cache around.
#[derive(Debug, Default)]
pub struct BucketCache {
    entries: HashMap<(i32, Granularity), Vec<CalendarBucket>>,
}

impl BucketCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, year: i32, granularity: Granularity) -> &[CalendarBucket] {
        self.entries
            .entry((year, granularity))
            .or_insert_with(|| build_buckets(year, granularity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
