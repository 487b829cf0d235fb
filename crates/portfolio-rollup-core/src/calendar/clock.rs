use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Source of "today" for anything that defaults to the current year.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local wall-clock calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// How many years either side of the current one to offer for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub past: u32,
    pub future: u32,
}

impl Default for YearWindow {
    fn default() -> Self {
        Self { past: 1, future: 4 }
    }
}

pub fn default_year(clock: &dyn Clock) -> i32 {
    clock.today().year()
}

/// Ascending list of selectable years around the clock's current year.
pub fn year_options(clock: &dyn Clock, window: YearWindow) -> Vec<i32> {
    let current = i64::from(default_year(clock));
    let first = current - i64::from(window.past);
    let last = current + i64::from(window.future);
    (first..=last)
        .filter_map(|y| i32::try_from(y).ok())
        .collect()
}
