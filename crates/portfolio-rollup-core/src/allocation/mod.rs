pub mod proration;
pub mod rollup;

pub use proration::{
    amount_for, overlap_days, DayFraction, ProrationMode, ProrationPolicy, WeekActive,
};
pub use rollup::{rollup, rollup_cached, rollup_with_policy, PortfolioRollup, Rollup, RollupRow};
