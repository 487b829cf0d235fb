use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::{CalendarBucket, DateRange};
use crate::error::RollupError;
use crate::types::{Amounts, WeeklyRate};

const DAYS_PER_WEEK: Decimal = dec!(7);

/// Converts a weekly rate and an overlap length into a bucket amount.
pub trait ProrationPolicy {
    /// Amount accrued over `overlap_days` inclusive days (always > 0);
    /// `None` if it does not fit in a `Decimal`.
    fn prorate(&self, rate: &WeeklyRate, overlap_days: i64) -> Option<Amounts>;

    fn name(&self) -> &'static str;
}

/// Accrues `days / 7` of the weekly rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayFraction;

impl ProrationPolicy for DayFraction {
    fn prorate(&self, rate: &WeeklyRate, overlap_days: i64) -> Option<Amounts> {
        Amounts::checked_scaled(rate, Decimal::from(overlap_days), DAYS_PER_WEEK)
    }

    fn name(&self) -> &'static str {
        "fractional"
    }
}

/// Accrues the whole weekly rate for any bucket the project touches.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekActive;

impl ProrationPolicy for WeekActive {
    fn prorate(&self, rate: &WeeklyRate, _overlap_days: i64) -> Option<Amounts> {
        Amounts::checked_new(rate.revenue, rate.cost, rate.adjustments)
    }

    fn name(&self) -> &'static str {
        "binary"
    }
}

/// Configuration-level selector over the two policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProrationMode {
    #[default]
    Fractional,
    Binary,
}

impl ProrationPolicy for ProrationMode {
    fn prorate(&self, rate: &WeeklyRate, overlap_days: i64) -> Option<Amounts> {
        match self {
            ProrationMode::Fractional => DayFraction.prorate(rate, overlap_days),
            ProrationMode::Binary => WeekActive.prorate(rate, overlap_days),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ProrationMode::Fractional => DayFraction.name(),
            ProrationMode::Binary => WeekActive.name(),
        }
    }
}

impl fmt::Display for ProrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProrationMode {
    type Err = RollupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fractional" | "day" => Ok(ProrationMode::Fractional),
            "binary" | "week" => Ok(ProrationMode::Binary),
            other => Err(RollupError::InvalidInput {
                field: "proration".to_string(),
                reason: format!("'{other}' is not one of: fractional, binary"),
            }),
        }
    }
}

/// Inclusive days shared by a project range and a bucket; 0 when disjoint.
pub fn overlap_days(range: &DateRange, bucket: &CalendarBucket) -> i64 {
    range
        .intersect(&bucket.range())
        .map_or(0, |overlap| overlap.days())
}

/// Amount a project accrues in one bucket under `policy`; `None` on overflow.
pub fn amount_for<P: ProrationPolicy + ?Sized>(
    range: &DateRange,
    rate: &WeeklyRate,
    bucket: &CalendarBucket,
    policy: &P,
) -> Option<Amounts> {
    match overlap_days(range, bucket) {
        0 => Some(Amounts::ZERO),
        days => policy.prorate(rate, days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bucket(start: NaiveDate, end: NaiveDate) -> CalendarBucket {
        CalendarBucket {
            index: 0,
            start,
            end,
            label: "test".to_string(),
        }
    }

    fn rate() -> WeeklyRate {
        WeeklyRate::new(dec!(10000), dec!(7000), dec!(0))
    }

    #[test]
    fn test_full_month_overlap() {
        let january = bucket(d(2024, 1, 1), d(2024, 1, 31));
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31));
        assert_eq!(overlap_days(&range, &january), 31);

        let a = amount_for(&range, &rate(), &january, &DayFraction).unwrap();
        assert_eq!(a.revenue, dec!(10000) * dec!(31) / dec!(7));
        assert_eq!(a.revenue.round_dp(2), dec!(44285.71));
        assert_eq!(a.margin.round_dp(2), dec!(13285.71));
        assert_eq!(a.margin, a.revenue - a.cost + a.adjustments);
    }

    #[test]
    fn test_disjoint_range_is_zero() {
        let january = bucket(d(2024, 1, 1), d(2024, 1, 31));
        let march = DateRange::new(d(2024, 3, 1), d(2024, 3, 31));
        assert_eq!(overlap_days(&march, &january), 0);
        assert_eq!(
            amount_for(&march, &rate(), &january, &DayFraction),
            Some(Amounts::ZERO)
        );
        assert_eq!(
            amount_for(&march, &rate(), &january, &WeekActive),
            Some(Amounts::ZERO)
        );
    }

    #[test]
    fn test_partial_overlap_prorates_by_day() {
        let week = bucket(d(2024, 1, 1), d(2024, 1, 7));
        let range = DateRange::new(d(2024, 1, 5), d(2024, 2, 1));
        assert_eq!(overlap_days(&range, &week), 3);
        let a = amount_for(&range, &rate(), &week, &DayFraction).unwrap();
        assert_eq!(a.cost, dec!(3000));
    }

    #[test]
    fn test_single_day_touch_counts_one_day() {
        let week = bucket(d(2024, 1, 1), d(2024, 1, 7));
        let range = DateRange::new(d(2024, 1, 7), d(2024, 1, 20));
        assert_eq!(overlap_days(&range, &week), 1);
    }

    #[test]
    fn test_week_active_charges_whole_rate() {
        let week = bucket(d(2024, 1, 1), d(2024, 1, 7));
        let range = DateRange::new(d(2024, 1, 7), d(2024, 1, 7));
        let a = amount_for(&range, &rate(), &week, &WeekActive).unwrap();
        assert_eq!(a, Amounts::new(dec!(10000), dec!(7000), dec!(0)));
    }

    #[test]
    fn test_overhanging_bucket_only_counts_real_overlap() {
        let last_week = bucket(d(2024, 12, 30), d(2025, 1, 5));
        let range = DateRange::full_year(2024).unwrap();
        assert_eq!(overlap_days(&range, &last_week), 2);
    }

    #[test]
    fn test_mode_delegates_to_policy() {
        let week = bucket(d(2024, 1, 1), d(2024, 1, 7));
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 2));
        assert_eq!(
            amount_for(&range, &rate(), &week, &ProrationMode::Fractional),
            amount_for(&range, &rate(), &week, &DayFraction)
        );
        assert_eq!(
            amount_for(&range, &rate(), &week, &ProrationMode::Binary),
            amount_for(&range, &rate(), &week, &WeekActive)
        );
        assert_eq!(ProrationMode::Binary.to_string(), "binary");
        assert_eq!(
            "binary".parse::<ProrationMode>().unwrap(),
            ProrationMode::Binary
        );
        assert!("hourly".parse::<ProrationMode>().is_err());
    }

    #[test]
    fn test_dyn_policy_is_usable() {
        let policies: [&dyn ProrationPolicy; 2] = [&DayFraction, &WeekActive];
        let week = bucket(d(2024, 1, 1), d(2024, 1, 7));
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 7));
        for policy in policies {
            let a = amount_for(&range, &rate(), &week, policy).unwrap();
            assert_eq!(a.revenue, dec!(10000), "policy {}", policy.name());
        }
    }

    #[test]
    fn test_overflowing_rate_yields_none() {
        let week = bucket(d(2024, 1, 1), d(2024, 1, 7));
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 7));
        let huge = WeeklyRate::new(dec!(20000000000000000000000000000), dec!(0), dec!(0));
        assert_eq!(amount_for(&range, &huge, &week, &DayFraction), None);

        // The whole rate fits, so charging it unscaled is fine.
        let charged = amount_for(&range, &huge, &week, &WeekActive).unwrap();
        assert_eq!(charged.revenue, huge.revenue);

        let lopsided = WeeklyRate::new(Decimal::MAX, Decimal::MIN, dec!(0));
        assert_eq!(amount_for(&range, &lopsided, &week, &WeekActive), None);
    }
}
