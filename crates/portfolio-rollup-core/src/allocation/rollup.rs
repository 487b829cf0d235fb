use serde::{Deserialize, Serialize};

use super::proration::{amount_for, DayFraction, ProrationPolicy};
use crate::calendar::{build_buckets, BucketCache, CalendarBucket, Granularity};
use crate::error::AmountError;
use crate::portfolio::FinancialEntity;
use crate::types::{Amounts, Rate};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-project allocation across the year's buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollupRow {
    pub entity: FinancialEntity,
    /// Why the project contributes nothing, if its range is unusable
    pub date_error: Option<String>,
    /// Why the project contributes nothing, if its amounts overflow
    pub rate_error: Option<String>,
    /// One entry per bucket, in bucket order
    pub amounts_by_bucket: Vec<Amounts>,
    pub total: Amounts,
    /// total.margin / total.revenue; None unless revenue > 0
    pub margin_pct: Option<Rate>,
}

/// Bucket-wise sum over every project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRollup {
    pub amounts_by_bucket: Vec<Amounts>,
    pub total: Amounts,
    pub margin_pct: Option<Rate>,
}

/// Full result of one rollup call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollup {
    pub year: i32,
    pub granularity: Granularity,
    pub buckets: Vec<CalendarBucket>,
    pub rows: Vec<RollupRow>,
    pub portfolio: PortfolioRollup,
}

impl Rollup {
    pub fn row(&self, id: &str) -> Option<&RollupRow> {
        self.rows.iter().find(|r| r.entity.id == id)
    }

    /// `(project id, message)` for every project with an unusable range.
    pub fn date_errors(&self) -> Vec<(&str, &str)> {
        self.rows
            .iter()
            .filter_map(|r| {
                r.date_error
                    .as_deref()
                    .map(|msg| (r.entity.id.as_str(), msg))
            })
            .collect()
    }

    /// `(project id, message)` for every project dropped on overflow.
    pub fn rate_errors(&self) -> Vec<(&str, &str)> {
        self.rows
            .iter()
            .filter_map(|r| {
                r.rate_error
                    .as_deref()
                    .map(|msg| (r.entity.id.as_str(), msg))
            })
            .collect()
    }
}

impl RollupRow {
    fn zeroed(entity: &FinancialEntity, bucket_count: usize) -> Self {
        RollupRow {
            entity: entity.clone(),
            date_error: None,
            rate_error: None,
            amounts_by_bucket: vec![Amounts::ZERO; bucket_count],
            total: Amounts::ZERO,
            margin_pct: None,
        }
    }

    fn zero_out(&mut self, error: AmountError) {
        tracing::warn!(id = %self.entity.id, "{error} Project contributes zero.");
        let bucket_count = self.amounts_by_bucket.len();
        *self = RollupRow {
            rate_error: Some(error.to_string()),
            ..RollupRow::zeroed(&self.entity, bucket_count)
        };
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Roll up `entities` over `year` with day-fraction proration.
///
/// Never fails: projects with bad ranges or amounts too large for a `Decimal`
/// contribute zero and carry a diagnostic, and an empty slice produces an
/// all-zero portfolio.
pub fn rollup(entities: &[FinancialEntity], year: i32, granularity: Granularity) -> Rollup {
    rollup_with_policy(entities, year, granularity, &DayFraction)
}

/// Roll up with an explicit proration policy.
pub fn rollup_with_policy<P: ProrationPolicy + ?Sized>(
    entities: &[FinancialEntity],
    year: i32,
    granularity: Granularity,
    policy: &P,
) -> Rollup {
    let buckets = build_buckets(year, granularity);
    rollup_over(entities, year, granularity, buckets, policy)
}

/// Roll up using a shared bucket cache.
pub fn rollup_cached<P: ProrationPolicy + ?Sized>(
    cache: &mut BucketCache,
    entities: &[FinancialEntity],
    year: i32,
    granularity: Granularity,
    policy: &P,
) -> Rollup {
    let buckets = cache.get(year, granularity).to_vec();
    rollup_over(entities, year, granularity, buckets, policy)
}

fn rollup_over<P: ProrationPolicy + ?Sized>(
    entities: &[FinancialEntity],
    year: i32,
    granularity: Granularity,
    buckets: Vec<CalendarBucket>,
    policy: &P,
) -> Rollup {
    let mut rows: Vec<RollupRow> = entities
        .iter()
        .map(|entity| project_row(entity, &buckets, policy))
        .collect();

    // Folded in input order. A row that would overflow the running sums is
    // zeroed, keeping the portfolio equal to the sum of the listed rows.
    let mut amounts_by_bucket = vec![Amounts::ZERO; buckets.len()];
    let mut total = Amounts::ZERO;
    for row in &mut rows {
        match accumulate(&amounts_by_bucket, &total, row) {
            Some((column, running)) => {
                amounts_by_bucket = column;
                total = running;
            }
            None => row.zero_out(AmountError::PortfolioOverflow),
        }
    }

    tracing::debug!(
        year,
        %granularity,
        policy = policy.name(),
        projects = rows.len(),
        buckets = buckets.len(),
        margin = %total.margin,
        "portfolio rollup complete"
    );

    Rollup {
        year,
        granularity,
        buckets,
        rows,
        portfolio: PortfolioRollup {
            amounts_by_bucket,
            margin_pct: total.margin_pct(),
            total,
        },
    }
}

fn accumulate(
    column: &[Amounts],
    total: &Amounts,
    row: &RollupRow,
) -> Option<(Vec<Amounts>, Amounts)> {
    let column = column
        .iter()
        .zip(&row.amounts_by_bucket)
        .map(|(sum, amount)| sum.checked_add(amount))
        .collect::<Option<Vec<_>>>()?;
    Some((column, total.checked_add(&row.total)?))
}

fn project_row<P: ProrationPolicy + ?Sized>(
    entity: &FinancialEntity,
    buckets: &[CalendarBucket],
    policy: &P,
) -> RollupRow {
    let range = match entity.range() {
        Ok(range) => range,
        Err(e) => {
            tracing::warn!(
                id = %entity.id,
                start = %entity.start,
                end = %entity.end,
                "{e} Project contributes zero."
            );
            return RollupRow {
                date_error: Some(e.to_string()),
                ..RollupRow::zeroed(entity, buckets.len())
            };
        }
    };

    let allocated = buckets
        .iter()
        .map(|bucket| amount_for(&range, &entity.weekly_rate, bucket, policy))
        .collect::<Option<Vec<_>>>()
        .and_then(|by_bucket| Some((Amounts::checked_sum(&by_bucket)?, by_bucket)));

    match allocated {
        Some((total, amounts_by_bucket)) => RollupRow {
            entity: entity.clone(),
            date_error: None,
            rate_error: None,
            amounts_by_bucket,
            margin_pct: total.margin_pct(),
            total,
        },
        None => {
            let mut row = RollupRow::zeroed(entity, buckets.len());
            row.zero_out(AmountError::ProjectOverflow);
            row
        }
    }
}
