/// Fractional digits kept for prices and averages.
pub const DECIMAL_PRECISION: u32 = 6;

/// Scale factor used by the fixed-point moving average (10^DECIMAL_PRECISION).
pub const FIXED_POINT_SCALE: i64 = 1_000_000;

/// Window used for the moving average in stock snapshots.
pub const SNAPSHOT_MOVING_AVERAGE_PERIODS: usize = 10;

/// Default batch size for the fetch scheduler.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Upper bound accepted for the batch size.
pub const MAX_CONCURRENT_REQUESTS_LIMIT: usize = 50;

/// Default pause between batches, in milliseconds.
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 1000;

/// Default fetch schedule: top of every minute, UTC.
pub const DEFAULT_FETCH_SCHEDULE: &str = "0 * * * * *";
