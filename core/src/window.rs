//! Dashboard aggregation window arithmetic.
//!
//! The dashboard scopes its counts to "since last venue close": the window
//! boundary is **yesterday's calendar date at 03:00:00.000 local time**,
//! computed by explicit date arithmetic rather than a rolling duration.
//! Depending on the time of day the boundary therefore looks back between
//! 3 and 27 hours.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveTime, TimeZone};

/// Hour of day (local) at which a venue night is considered closed.
pub const WINDOW_HOUR: u32 = 3;

/// The most recent window boundary for the given "now": yesterday at 03:00
/// in the same timezone.
///
/// Around daylight-saving shifts an ambiguous local 03:00 resolves to the
/// earlier instant; a nonexistent one falls back to 24 hours before `now`.
#[must_use]
pub fn boundary<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let close = NaiveTime::from_hms_opt(WINDOW_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let yesterday = now.date_naive() - Days::new(1);
    match now.timezone().from_local_datetime(&yesterday.and_time(close)) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at,
        LocalResult::None => now.clone() - Duration::hours(24),
    }
}
