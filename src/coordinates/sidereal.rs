use chrono::{DateTime, Utc};

/// 2000-01-01T12:00:00Z as milliseconds since the unix epoch
pub const J2000_UNIX_MILLIS: i64 = 946_728_000_000;
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// GMST in hours at the reference epoch
const GMST_AT_J2000_HOURS: f64 = 18.697374558;
/// sidereal hours elapsed per solar day
const SIDEREAL_HOURS_PER_DAY: f64 = 24.06570982441908;

/// fractional days elapsed since 2000-01-01T12:00:00 UTC, negative before it
pub fn days_since_j2000(instant: &DateTime<Utc>) -> f64 {
    (instant.timestamp_millis() - J2000_UNIX_MILLIS) as f64 / MILLIS_PER_DAY
}

/// Greenwich Mean Sidereal Time in hours, [0, 24)
///
/// Linear approximation, good to well under a second of time over this century
/// and enough for placing naked-eye stars on screen.
pub fn gmst_hours(instant: &DateTime<Utc>) -> f64 {
    let d = days_since_j2000(instant);
    wrap_hours(GMST_AT_J2000_HOURS + SIDEREAL_HOURS_PER_DAY * d)
}

/// Local Sidereal Time in hours, [0, 24). Longitude is in degrees, east positive.
pub fn local_sidereal_hours(instant: &DateTime<Utc>, longitude: f64) -> f64 {
    wrap_hours(gmst_hours(instant) + longitude / 15.0)
}

/// wraps an hour value into [0, 24)
pub fn wrap_hours(hours: f64) -> f64 {
    let wrapped = hours.rem_euclid(24.0);
    // rem_euclid rounds tiny negative inputs up to exactly 24.0
    if wrapped >= 24.0 {
        0.0
    } else {
        wrapped
    }
}
