//! Snowflake identifier conversion
//!
//! Snowflakes are time-ordered 64-bit ids. The upper 42 bits hold the
//! creation time in milliseconds since the platform epoch, so a timestamp
//! maps to the smallest id that could have been created at that instant:
//!
//! ```text
//! snowflake = (unix_ms - DISCORD_EPOCH_MS) << 22
//! ```

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Platform epoch (2015-01-01T00:00:00Z) in Unix milliseconds
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// Number of low bits used for worker, process and sequence fields
pub const TIMESTAMP_SHIFT: u32 = 22;

const MAX_TIMESTAMP_OFFSET: i64 = (1 << 42) - 1;

/// Convert a UTC datetime to its snowflake lower bound
pub fn datetime_to_snowflake(datetime: &DateTime<Utc>) -> Result<u64> {
    let offset = datetime.timestamp_millis() - DISCORD_EPOCH_MS;
    if offset < 0 {
        return Err(Error::snowflake(format!(
            "{datetime} is before the platform epoch"
        )));
    }
    if offset > MAX_TIMESTAMP_OFFSET {
        return Err(Error::snowflake(format!(
            "{datetime} is too far in the future"
        )));
    }
    Ok((offset as u64) << TIMESTAMP_SHIFT)
}

/// Recover the creation time encoded in a snowflake
pub fn snowflake_to_datetime(id: u64) -> Result<DateTime<Utc>> {
    let millis = (id >> TIMESTAMP_SHIFT) as i64 + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| Error::snowflake(format!("{id} does not encode a valid timestamp")))
}

/// Parse a snowflake string and recover its creation time
pub fn parse_snowflake_time(id: &str) -> Result<DateTime<Utc>> {
    let value: u64 = id
        .trim()
        .parse()
        .map_err(|e| Error::snowflake(format!("'{id}' is not a snowflake: {e}")))?;
    snowflake_to_datetime(value)
}
