pub mod buckets;
pub mod clock;
pub mod dates;

pub use buckets::{build_buckets, BucketCache, CalendarBucket, Granularity};
pub use clock::{default_year, year_options, Clock, FixedClock, SystemClock, YearWindow};
pub use dates::{clamp_to_year, normalize, parse_range, validate, DateRange};
