use clap::Args;
use serde_json::{json, Value};
use std::time::Instant;

use portfolio_rollup_core::calendar::{
    build_buckets, default_year, year_options, Clock, DateRange, Granularity,
};
use portfolio_rollup_core::with_metadata;

use crate::config::AppConfig;

/// Arguments for printing a year's bucket calendar
#[derive(Args)]
pub struct BucketsArgs {
    /// Fiscal year (defaults to the current year)
    #[arg(long, allow_hyphen_values = true)]
    pub year: Option<i32>,

    /// Bucket size
    #[arg(long, ignore_case = true, value_parser = super::granularity_parser())]
    pub granularity: Option<Granularity>,
}

pub fn run_buckets(
    args: BucketsArgs,
    config: &AppConfig,
    clock: &dyn Clock,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let year = args.year.unwrap_or_else(|| default_year(clock));
    let granularity = args.granularity.unwrap_or(config.granularity);

    let buckets = build_buckets(year, granularity);
    let mut warnings = Vec::new();
    match (buckets.last(), DateRange::full_year(year)) {
        (Some(last), Some(bounds)) if last.end > bounds.end => {
            warnings.push(format!("{} runs past December 31 to {}", last.label, last.end));
        }
        (None, _) => warnings.push(format!("Year {year} is outside the supported calendar")),
        _ => {}
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Calendar bucket generation",
        &json!({ "year": year, "granularity": granularity }),
        warnings,
        elapsed,
        buckets,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_years(
    config: &AppConfig,
    clock: &dyn Clock,
) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "today": clock.today(),
        "default_year": default_year(clock),
        "year_options": year_options(clock, config.year_window),
    }))
}
