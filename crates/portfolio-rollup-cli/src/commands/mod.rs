pub mod calendar;
pub mod rollup;

use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};

use portfolio_rollup_core::calendar::Granularity;
use portfolio_rollup_core::ProrationMode;

/// `--granularity` values, listed in `--help`.
pub fn granularity_parser() -> impl TypedValueParser<Value = Granularity> {
    PossibleValuesParser::new([
        PossibleValue::new("month").alias("monthly"),
        PossibleValue::new("week").alias("weekly"),
    ])
    .try_map(|s| s.parse::<Granularity>())
}

/// `--proration` values, listed in `--help`.
pub fn proration_parser() -> impl TypedValueParser<Value = ProrationMode> {
    PossibleValuesParser::new([
        PossibleValue::new("fractional")
            .alias("day")
            .help("Prorate by days of overlap / 7"),
        PossibleValue::new("binary")
            .alias("week")
            .help("Whole weekly rate for any touched bucket"),
    ])
    .try_map(|s| s.parse::<ProrationMode>())
}
