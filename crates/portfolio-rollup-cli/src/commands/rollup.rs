use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;

use portfolio_rollup_core::calendar::{default_year, Clock, Granularity};
use portfolio_rollup_core::{
    with_metadata, FinancialEntity, Portfolio, ProrationMode, ProrationPolicy,
};

use crate::config::AppConfig;
use crate::input;

/// Arguments for a portfolio rollup
#[derive(Args)]
pub struct RollupArgs {
    /// Path to JSON/YAML portfolio file
    #[arg(long)]
    pub input: Option<String>,

    /// Fiscal year (defaults to the file's year, then the current year)
    #[arg(long, allow_hyphen_values = true)]
    pub year: Option<i32>,

    /// Bucket size
    #[arg(long, ignore_case = true, value_parser = super::granularity_parser())]
    pub granularity: Option<Granularity>,

    /// Proration policy
    #[arg(long, ignore_case = true, value_parser = super::proration_parser())]
    pub proration: Option<ProrationMode>,
}

/// Arguments for re-clamping a portfolio to another year
#[derive(Args)]
pub struct ClampArgs {
    /// Path to JSON/YAML portfolio file
    #[arg(long)]
    pub input: Option<String>,

    /// Year to clamp every project range into
    #[arg(long, allow_hyphen_values = true)]
    pub year: i32,
}

/// Arguments for date-range validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to JSON/YAML portfolio file
    #[arg(long)]
    pub input: Option<String>,
}

/// Settings carried by a portfolio file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortfolioSettings {
    pub year: Option<i32>,
    pub granularity: Option<Granularity>,
    pub proration: Option<ProrationMode>,
    pub projects: Vec<FinancialEntity>,
}

/// A portfolio file is either a settings object or a bare list of projects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PortfolioDocument {
    Projects(Vec<FinancialEntity>),
    Settings(PortfolioSettings),
}

impl PortfolioDocument {
    fn into_settings(self) -> PortfolioSettings {
        match self {
            PortfolioDocument::Projects(projects) => PortfolioSettings {
                projects,
                ..PortfolioSettings::default()
            },
            PortfolioDocument::Settings(settings) => settings,
        }
    }
}

/// Explicit choices from the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub year: Option<i32>,
    pub granularity: Option<Granularity>,
    pub proration: Option<ProrationMode>,
}

#[derive(Debug)]
pub struct Resolved {
    pub portfolio: Portfolio,
    pub proration: ProrationMode,
    pub warnings: Vec<String>,
}

/// Merge flags over file settings over config over the clock's year.
///
/// When a flag moves the portfolio to a different year than the one its file
/// was saved with, project ranges are re-clamped into the new year.
pub fn resolve(
    doc: PortfolioDocument,
    overrides: Overrides,
    config: &AppConfig,
    clock: &dyn Clock,
) -> Resolved {
    let settings = doc.into_settings();
    let mut warnings = Vec::new();

    let year = overrides
        .year
        .or(settings.year)
        .unwrap_or_else(|| default_year(clock));
    let granularity = overrides
        .granularity
        .or(settings.granularity)
        .unwrap_or(config.granularity);
    let proration = overrides
        .proration
        .or(settings.proration)
        .unwrap_or(config.proration);

    let portfolio = match settings.year {
        Some(saved) if saved != year => {
            warnings.push(format!(
                "Project ranges re-clamped from {saved} to {year}"
            ));
            Portfolio::new(saved, granularity, settings.projects).with_year(year)
        }
        _ => Portfolio::new(year, granularity, settings.projects),
    };

    Resolved {
        portfolio,
        proration,
        warnings,
    }
}

fn load(path: Option<&str>, what: &str) -> Result<PortfolioDocument, Box<dyn std::error::Error>> {
    input::read_document(path, what)
}

pub fn run_rollup(
    args: RollupArgs,
    config: &AppConfig,
    clock: &dyn Clock,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let doc = load(args.input.as_deref(), "portfolio rollup")?;
    let overrides = Overrides {
        year: args.year,
        granularity: args.granularity,
        proration: args.proration,
    };
    let Resolved {
        portfolio,
        proration,
        mut warnings,
    } = resolve(doc, overrides, config, clock);

    let rollup = portfolio.rollup(&proration);

    for (id, message) in rollup.date_errors().into_iter().chain(rollup.rate_errors()) {
        warnings.push(format!("Project '{id}': {message}"));
    }
    if proration == ProrationMode::Binary && portfolio.granularity == Granularity::Month {
        warnings.push(
            "Binary proration charges a full weekly rate per touched month".to_string(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        &format!(
            "Calendar-bucketed portfolio rollup ({} proration)",
            proration.name()
        ),
        &json!({
            "year": portfolio.year,
            "granularity": portfolio.granularity,
            "proration": proration,
            "projects": portfolio.projects.len(),
        }),
        warnings,
        elapsed,
        rollup,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_clamp(args: ClampArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let settings = load(args.input.as_deref(), "clamping")?.into_settings();
    let saved_year = settings.year.unwrap_or(args.year);
    let portfolio = Portfolio::new(
        saved_year,
        settings.granularity.unwrap_or_default(),
        settings.projects,
    )
    .with_year(args.year);
    Ok(serde_json::to_value(portfolio)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let settings = load(args.input.as_deref(), "validation")?.into_settings();

    let checks: Vec<Value> = settings
        .projects
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "start": p.start,
                "end": p.end,
                "date_error": p.date_error().map(|e| e.to_string()),
            })
        })
        .collect();
    let invalid = checks.iter().filter(|c| !c["date_error"].is_null()).count();

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Project date-range validation",
        &json!({ "projects": checks.len(), "invalid": invalid }),
        Vec::new(),
        elapsed,
        checks,
    );
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use portfolio_rollup_core::calendar::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    fn doc(json: &str) -> PortfolioDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_bare_project_list_uses_clock_and_config() {
        let d = doc(r#"[{"id": "a", "name": "A", "start": "2026-01-01", "end": "2026-03-31"}]"#);
        let config = AppConfig {
            granularity: Granularity::Week,
            ..AppConfig::default()
        };
        let r = resolve(d, Overrides::default(), &config, &clock());
        assert_eq!(r.portfolio.year, 2026);
        assert_eq!(r.portfolio.granularity, Granularity::Week);
        assert_eq!(r.proration, ProrationMode::Fractional);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_flags_override_file_settings() {
        let d = doc(
            r#"{"year": 2024, "granularity": "week", "proration": "binary",
                "projects": [{"id": "a", "name": "A", "start": "2024-06-01", "end": "2025-02-01"}]}"#,
        );
        let overrides = Overrides {
            year: Some(2025),
            granularity: Some(Granularity::Month),
            proration: Some(ProrationMode::Fractional),
        };
        let r = resolve(d, overrides, &AppConfig::default(), &clock());
        assert_eq!(r.portfolio.year, 2025);
        assert_eq!(r.portfolio.granularity, Granularity::Month);
        assert_eq!(r.proration, ProrationMode::Fractional);
        assert_eq!(r.portfolio.projects[0].start, "2025-01-01");
        assert_eq!(r.portfolio.projects[0].end, "2025-02-01");
        assert_eq!(r.warnings, vec!["Project ranges re-clamped from 2024 to 2025"]);
    }

    #[test]
    fn test_same_year_does_not_reclamp() {
        let d = doc(
            r#"{"year": 2024, "projects": [{"id": "a", "name": "A", "start": "2023-06-01", "end": "2024-02-01"}]}"#,
        );
        let overrides = Overrides {
            year: Some(2024),
            ..Overrides::default()
        };
        let r = resolve(d, overrides, &AppConfig::default(), &clock());
        assert_eq!(r.portfolio.projects[0].start, "2023-06-01");
        assert!(r.warnings.is_empty());
    }
}
