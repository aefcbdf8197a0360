//! Closing-time arithmetic over weekly opening periods.
//!
//! The provider reports opening periods as (day-of-week, "HHMM") endpoints
//! in the venue's local time, plus a UTC offset. The active period is the
//! one containing the current local instant; if none contains it but one
//! starts within the next 7 days, the nearest future period stands in (a
//! venue whose current period already elapsed still has a meaningful "until"
//! answer). When nothing parses, closing time stays unknown — it is never
//! fabricated as "closed".

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use crate::types::OpeningPeriod;

/// A resolved closing time: a wall-clock label in the venue's local time and
/// the absolute instant it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingTime {
    pub label: String,
    pub close_ts: DateTime<Utc>,
}

/// Whole minutes from `now` until `close_ts`; negative when already past.
#[must_use]
pub fn remaining_minutes(close_ts: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (close_ts - now).num_minutes()
}

/// Resolves the closing time for `now` against a weekly schedule.
///
/// Returns `None` for empty schedules, always-open periods (no close
/// endpoint), unparseable times, or an out-of-range offset.
#[must_use]
pub fn closing_time(
    periods: &[OpeningPeriod],
    tz_offset_secs: i32,
    now: DateTime<Utc>,
) -> Option<ClosingTime> {
    let offset = FixedOffset::east_opt(tz_offset_secs)?;
    let now_local = now.with_timezone(&offset);
    let today = now_local.date_naive();
    let weekday = i64::from(now_local.weekday().num_days_from_sunday());

    let mut containing: Option<DateTime<FixedOffset>> = None;
    let mut next_future: Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> = None;

    // -1 catches overnight periods that opened yesterday and close today.
    for day_offset in -1_i64..=7 {
        let date = today + Duration::days(day_offset);
        let dow = u32::try_from((weekday + day_offset).rem_euclid(7)).unwrap_or(0);

        for period in periods {
            if period.open.day != dow {
                continue;
            }
            let Some(close) = &period.close else {
                continue;
            };
            let Some((open_h, open_m)) = parse_hhmm(&period.open.time) else {
                continue;
            };
            let Some((close_h, close_m)) = parse_hhmm(&close.time) else {
                continue;
            };
            let Some(open_naive) = date.and_hms_opt(open_h, open_m, 0) else {
                continue;
            };
            let Some(open_dt) = offset.from_local_datetime(&open_naive).single() else {
                continue;
            };

            let Some(close_time) = NaiveTime::from_hms_opt(close_h, close_m, 0) else {
                continue;
            };
            let day_span = (i64::from(close.day) - i64::from(period.open.day)).rem_euclid(7);
            // Same-day close at or before the open time means it wraps past
            // midnight.
            let wraps = day_span == 0 && close_time <= open_naive.time();
            let close_date = date + Duration::days(day_span + i64::from(wraps));
            let close_naive = close_date.and_time(close_time);
            let Some(close_dt) = offset.from_local_datetime(&close_naive).single() else {
                continue;
            };

            if open_dt <= now_local && now_local < close_dt {
                containing = match containing {
                    Some(existing) if existing <= close_dt => Some(existing),
                    _ => Some(close_dt),
                };
            } else if open_dt > now_local {
                next_future = match next_future {
                    Some((existing_open, _)) if existing_open <= open_dt => next_future,
                    _ => Some((open_dt, close_dt)),
                };
            }
        }
    }

    let close_dt = containing.or(next_future.map(|(_, close)| close))?;
    Some(ClosingTime {
        label: close_dt.format("%-I:%M %p").to_string(),
        close_ts: close_dt.with_timezone(&Utc),
    })
}

/// Parses a provider "HHMM" time string.
fn parse_hhmm(raw: &str) -> Option<(u32, u32)> {
    if raw.len() != 4 || !raw.is_ascii() {
        return None;
    }
    let hours: u32 = raw[..2].parse().ok()?;
    let minutes: u32 = raw[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some((hours, minutes))
}
