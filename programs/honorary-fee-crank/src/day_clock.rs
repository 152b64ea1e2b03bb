use crate::constants::SECONDS_PER_DAY;

/// Integer day index for a unix timestamp, `floor(now / 86400)`.
/// Negative timestamps floor towards the previous day.
pub fn day_id(unix_timestamp: i64) -> i64 {
    unix_timestamp.div_euclid(SECONDS_PER_DAY)
}

/// First second of the given day
pub fn day_start(day_id: i64) -> i64 {
    day_id.saturating_mul(SECONDS_PER_DAY)
}
