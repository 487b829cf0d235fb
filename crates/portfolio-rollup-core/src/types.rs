use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Constant per-week accrual of a project while it is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyRate {
    pub revenue: Money,
    pub cost: Money,
    pub adjustments: Money,
}

impl WeeklyRate {
    pub fn new(revenue: Money, cost: Money, adjustments: Money) -> Self {
        Self {
            revenue,
            cost,
            adjustments,
        }
    }
}

/// Revenue, cost and adjustments for some period, with the derived margin.
///
/// `margin` is always `revenue - cost + adjustments`; construct through
/// [`Amounts::new`] or the `checked_*` constructors so the identity cannot
/// drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amounts {
    pub revenue: Money,
    pub cost: Money,
    pub adjustments: Money,
    pub margin: Money,
}

impl Amounts {
    pub const ZERO: Amounts = Amounts {
        revenue: Decimal::ZERO,
        cost: Decimal::ZERO,
        adjustments: Decimal::ZERO,
        margin: Decimal::ZERO,
    };

    /// # Panics
    ///
    /// When the derived margin overflows `Decimal`; use
    /// [`Amounts::checked_new`] for untrusted figures.
    pub fn new(revenue: Money, cost: Money, adjustments: Money) -> Self {
        Self {
            revenue,
            cost,
            adjustments,
            margin: revenue - cost + adjustments,
        }
    }

    /// Like [`Amounts::new`], returning `None` if the margin overflows.
    pub fn checked_new(revenue: Money, cost: Money, adjustments: Money) -> Option<Self> {
        let margin = revenue.checked_sub(cost)?.checked_add(adjustments)?;
        Some(Self {
            revenue,
            cost,
            adjustments,
            margin,
        })
    }

    /// Scale a weekly rate by `numerator / denominator`.
    ///
    /// Multiplication happens before division so whole-week factors stay exact.
    /// `None` on overflow or a zero denominator.
    pub fn checked_scaled(
        rate: &WeeklyRate,
        numerator: Decimal,
        denominator: Decimal,
    ) -> Option<Self> {
        let scale = |v: Money| v.checked_mul(numerator)?.checked_div(denominator);
        Self::checked_new(
            scale(rate.revenue)?,
            scale(rate.cost)?,
            scale(rate.adjustments)?,
        )
    }

    /// Component-wise sum with the margin re-derived; `None` on overflow.
    pub fn checked_add(&self, rhs: &Amounts) -> Option<Self> {
        Self::checked_new(
            self.revenue.checked_add(rhs.revenue)?,
            self.cost.checked_add(rhs.cost)?,
            self.adjustments.checked_add(rhs.adjustments)?,
        )
    }

    /// Sum of `items`, starting from zero; `None` if any partial sum overflows.
    pub fn checked_sum<'a, I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Amounts>,
    {
        items
            .into_iter()
            .try_fold(Amounts::ZERO, |acc, a| acc.checked_add(a))
    }

    pub fn is_zero(&self) -> bool {
        self.revenue.is_zero()
            && self.cost.is_zero()
            && self.adjustments.is_zero()
            && self.margin.is_zero()
    }

    /// Margin over revenue; `None` unless revenue is strictly positive and
    /// the quotient fits in a `Decimal`.
    pub fn margin_pct(&self) -> Option<Rate> {
        if self.revenue > Decimal::ZERO {
            self.margin.checked_div(self.revenue)
        } else {
            None
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_margin_includes_adjustments() {
        let a = Amounts::new(dec!(100), dec!(70), dec!(-5));
        assert_eq!(a.margin, dec!(25));
    }

    #[test]
    fn test_addition_rederives_margin() {
        let total = Amounts::new(dec!(10), dec!(4), dec!(1))
            .checked_add(&Amounts::new(dec!(5), dec!(6), dec!(0)))
            .unwrap();
        assert_eq!(total, Amounts::new(dec!(15), dec!(10), dec!(1)));
        assert_eq!(total.margin, dec!(6));
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total = Amounts::checked_sum(&Vec::<Amounts>::new()).unwrap();
        assert!(total.is_zero());
    }

    #[test]
    fn test_scaled_multiplies_before_dividing() {
        let rate = WeeklyRate::new(dec!(7000), dec!(3500), dec!(0));
        let a = Amounts::checked_scaled(&rate, dec!(14), dec!(7)).unwrap();
        assert_eq!(a.revenue, dec!(14000));
        assert_eq!(a.cost, dec!(7000));
        assert_eq!(a.margin, dec!(7000));
    }

    #[test]
    fn test_margin_pct_guards_non_positive_revenue() {
        assert_eq!(Amounts::new(dec!(0), dec!(10), dec!(0)).margin_pct(), None);
        assert_eq!(Amounts::new(dec!(-5), dec!(0), dec!(0)).margin_pct(), None);
        assert_eq!(
            Amounts::new(dec!(200), dec!(150), dec!(0)).margin_pct(),
            Some(dec!(0.25))
        );
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge = WeeklyRate::new(Decimal::MAX, dec!(0), dec!(0));
        assert_eq!(Amounts::checked_scaled(&huge, dec!(2), dec!(7)), None);
        assert_eq!(Amounts::checked_scaled(&huge, dec!(1), dec!(0)), None);

        let big = Amounts::new(dec!(30000000000000000000000000000), dec!(0), dec!(0));
        assert!(big.checked_add(&big).is_some());
        assert_eq!(Amounts::checked_sum(&[big, big, big]), None);

        // Revenue fits but revenue - cost does not.
        assert_eq!(Amounts::checked_new(Decimal::MAX, Decimal::MIN, dec!(0)), None);
    }

    #[test]
    fn test_margin_pct_with_tiny_revenue_is_none() {
        let a = Amounts::new(dec!(0.0000000000000000000000000001), dec!(-1000), dec!(0));
        assert_eq!(a.margin_pct(), None);
    }
}
