use chrono::NaiveDate;
use portfolio_rollup_core::calendar::{
    clamp_to_year, default_year, normalize, validate, year_options, BucketCache, DateRange,
    FixedClock, Granularity, YearWindow,
};
use portfolio_rollup_core::{DateRangeError, RollupError};
use rstest::rstest;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

#[rstest]
#[case("2024-02-30")]
#[case("2024-04-31")]
#[case("2023-02-29")]
#[case("2024-00-10")]
#[case("2024/01/10")]
#[case("01-10-2024")]
fn test_rejected_inputs(#[case] input: &str) {
    assert!(matches!(normalize(input), Err(RollupError::DateError(_))));
}

#[test]
fn test_leap_day_accepted() {
    assert_eq!(normalize("2024-02-29").unwrap(), d(2024, 2, 29));
}

#[test]
fn test_validate_messages() {
    assert_eq!(validate("2024-01-01", "2024-12-31"), None);
    assert_eq!(validate("2024-01-01", ""), Some(DateRangeError::Missing));
    assert_eq!(
        validate("2024-12-31", "2024-01-01"),
        Some(DateRangeError::Inverted)
    );
}

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

#[rstest]
#[case(d(2024, 1, 1), d(2024, 12, 31))]
#[case(d(2024, 2, 29), d(2024, 3, 1))]
#[case(d(2024, 7, 4), d(2024, 7, 4))]
fn test_clamp_is_idempotent_in_year(#[case] start: NaiveDate, #[case] end: NaiveDate) {
    let r = DateRange::new(start, end);
    assert_eq!(clamp_to_year(r, 2024), r);
}

#[test]
fn test_clamp_before_year() {
    let r = DateRange::new(d(2020, 1, 1), d(2021, 6, 30));
    assert_eq!(
        clamp_to_year(r, 2024),
        DateRange::new(d(2024, 1, 1), d(2024, 1, 1))
    );
}

#[test]
fn test_clamp_leap_day_into_common_year() {
    let r = DateRange::new(d(2024, 2, 29), d(2024, 12, 31));
    assert_eq!(
        clamp_to_year(r, 2023),
        DateRange::new(d(2023, 12, 31), d(2023, 12, 31))
    );
}

#[test]
fn test_clamp_unrepresentable_year_is_noop() {
    let r = DateRange::new(d(2024, 1, 1), d(2024, 2, 1));
    assert_eq!(clamp_to_year(r, i32::MAX), r);
}

// ---------------------------------------------------------------------------
// Clock and cache
// ---------------------------------------------------------------------------

#[test]
fn test_year_options_from_injected_clock() {
    let clock = FixedClock(d(2031, 1, 1));
    assert_eq!(default_year(&clock), 2031);
    assert_eq!(
        year_options(&clock, YearWindow { past: 2, future: 1 }),
        vec![2029, 2030, 2031, 2032]
    );
}

#[test]
fn test_cache_returns_fresh_sequence_per_key() {
    let mut cache = BucketCache::new();
    assert_eq!(cache.get(2023, Granularity::Month).len(), 12);
    assert_eq!(cache.get(2023, Granularity::Week).len(), 53);
    assert_eq!(cache.len(), 2);
}
