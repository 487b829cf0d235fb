pub mod allocation;
pub mod calendar;
pub mod error;
pub mod portfolio;
pub mod types;

pub use error::{AmountError, DateRangeError, RollupError};
pub use types::*;

pub use allocation::{rollup, ProrationMode, ProrationPolicy, Rollup};
pub use calendar::{build_buckets, CalendarBucket, Granularity};
pub use portfolio::{FinancialEntity, Portfolio};

/// Standard result type for all portfolio-rollup operations
pub type RollupResult<T> = Result<T, RollupError>;
