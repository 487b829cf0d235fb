use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::dates::{clamp_date, DATE_FORMAT};
use crate::calendar::{clamp_to_year, normalize, parse_range, DateRange};
use crate::error::DateRangeError;
use crate::types::WeeklyRate;

/// A project: an active date range plus a constant weekly rate.
///
/// Dates are kept as the text the user entered so that malformed input
/// survives round trips and can be reported rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialEntity {
    pub id: String,
    pub name: String,
    /// Inclusive start, `YYYY-MM-DD`
    #[serde(default)]
    pub start: String,
    /// Inclusive end, `YYYY-MM-DD`
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub weekly_rate: WeeklyRate,
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl FinancialEntity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        weekly_rate: WeeklyRate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start: start.into(),
            end: end.into(),
            weekly_rate,
        }
    }

    /// A project active for the whole of `year`.
    pub fn for_year(
        id: impl Into<String>,
        name: impl Into<String>,
        year: i32,
        weekly_rate: WeeklyRate,
    ) -> Self {
        let (start, end) = match DateRange::full_year(year) {
            Some(r) => (format_date(r.start), format_date(r.end)),
            None => (String::new(), String::new()),
        };
        Self::new(id, name, start, end, weekly_rate)
    }

    pub fn range(&self) -> Result<DateRange, DateRangeError> {
        parse_range(&self.start, &self.end)
    }

    pub fn date_error(&self) -> Option<DateRangeError> {
        self.range().err()
    }

    /// Copy of this project with its range pulled into `year`.
    ///
    /// Each endpoint that parses is clamped; one that does not is left as
    /// typed so the diagnostic still shows up in the rollup.
    pub fn reclamped(&self, year: i32) -> Self {
        let Some(bounds) = DateRange::full_year(year) else {
            return self.clone();
        };

        let (start, end) = match (normalize(&self.start), normalize(&self.end)) {
            (Ok(s), Ok(e)) => {
                let r = clamp_to_year(DateRange::new(s, e), year);
                (format_date(r.start), format_date(r.end))
            }
            (Ok(s), Err(_)) => (
                format_date(clamp_date(s, bounds.start, bounds.end)),
                self.end.clone(),
            ),
            (Err(_), Ok(e)) => (
                self.start.clone(),
                format_date(clamp_date(e, bounds.start, bounds.end)),
            ),
            (Err(_), Err(_)) => (self.start.clone(), self.end.clone()),
        };

        if start != self.start || end != self.end {
            tracing::debug!(
                id = %self.id,
                from = %format!("{}..{}", self.start, self.end),
                to = %format!("{start}..{end}"),
                year,
                "re-clamped project range"
            );
        }

        Self {
            start,
            end,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate() -> WeeklyRate {
        WeeklyRate::new(dec!(100), dec!(50), dec!(0))
    }

    #[test]
    fn test_for_year_spans_full_year() {
        let p = FinancialEntity::for_year("p1", "Alpha", 2024, rate());
        assert_eq!(p.start, "2024-01-01");
        assert_eq!(p.end, "2024-12-31");
        assert_eq!(p.range().unwrap().days(), 366);
    }

    #[test]
    fn test_reclamp_moves_range_into_new_year() {
        let p = FinancialEntity::for_year("p1", "Alpha", 2024, rate());
        let moved = p.reclamped(2025);
        // Entirely before 2025, so it collapses to Jan 1.
        assert_eq!(moved.start, "2025-01-01");
        assert_eq!(moved.end, "2025-01-01");
        assert_eq!(moved.weekly_rate, p.weekly_rate);
    }

    #[test]
    fn test_reclamp_keeps_in_year_range() {
        let p = FinancialEntity::new("p1", "Alpha", "2024-04-01", "2024-06-30", rate());
        assert_eq!(p.reclamped(2024), p);
    }

    #[test]
    fn test_reclamp_leaves_malformed_endpoint_alone() {
        let p = FinancialEntity::new("p1", "Alpha", "2023-05-01", "soon", rate());
        let moved = p.reclamped(2024);
        assert_eq!(moved.start, "2024-01-01");
        assert_eq!(moved.end, "soon");
        assert_eq!(moved.date_error(), Some(DateRangeError::Missing));
    }

    #[test]
    fn test_reclamp_fixes_inverted_range() {
        let p = FinancialEntity::new("p1", "Alpha", "2024-09-01", "2024-02-01", rate());
        assert_eq!(p.date_error(), Some(DateRangeError::Inverted));
        let fixed = p.reclamped(2024);
        assert_eq!(fixed.start, "2024-09-01");
        assert_eq!(fixed.end, "2024-09-01");
        assert_eq!(fixed.date_error(), None);
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let p: FinancialEntity = serde_json::from_str(r#"{"id": "p9", "name": "Bare"}"#).unwrap();
        assert_eq!(p.start, "");
        assert_eq!(p.weekly_rate, WeeklyRate::default());
        assert_eq!(p.date_error(), Some(DateRangeError::Missing));
    }
}
