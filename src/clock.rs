//! FILETIME clock conversion
//!
//! The logger stamps files with Windows FILETIME values: 100-nanosecond
//! ticks counted from 1601-01-01T00:00:00Z.

use crate::error::ClockError;
use chrono::{DateTime, Duration, Utc};

/// FILETIME ticks between 1601-01-01 and 1970-01-01
pub const FILETIME_UNIX_OFFSET: u64 = 116_444_736_000_000_000;

/// FILETIME ticks per second
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Convert a FILETIME tick count to a UTC instant.
///
/// Sub-second remainder is kept at tick (100 ns) resolution; whole seconds
/// truncate toward zero.
pub fn to_utc(ticks: u64) -> Result<DateTime<Utc>, ClockError> {
    let since_epoch = ticks
        .checked_sub(FILETIME_UNIX_OFFSET)
        .ok_or(ClockError::NegativeResult(ticks))?;

    let seconds = i64::try_from(since_epoch / TICKS_PER_SECOND).map_err(|_| ClockError::Overflow)?;
    let nanos = ((since_epoch % TICKS_PER_SECOND) * 100) as u32;

    DateTime::from_timestamp(seconds, nanos).ok_or(ClockError::Overflow)
}

/// Inverse of [`to_utc`] for instants at or after the Unix epoch
pub fn to_filetime(instant: DateTime<Utc>) -> Option<u64> {
    let seconds = u64::try_from(instant.timestamp()).ok()?;
    let sub_ticks = u64::from(instant.timestamp_subsec_nanos()) / 100;
    seconds
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(sub_ticks)?
        .checked_add(FILETIME_UNIX_OFFSET)
}

/// `anchor + millis` milliseconds, failing with `Overflow` past the
/// representable range
pub fn offset_millis(anchor: DateTime<Utc>, millis: u64) -> Result<DateTime<Utc>, ClockError> {
    let millis = i64::try_from(millis).map_err(|_| ClockError::Overflow)?;
    let delta = Duration::try_milliseconds(millis).ok_or(ClockError::Overflow)?;
    anchor.checked_add_signed(delta).ok_or(ClockError::Overflow)
}
