//! Calendar boundary math on millisecond timestamps.
//!
//! Everything is generic over a `chrono::TimeZone` so the binary can use the
//! local zone while tests pin a fixed offset.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeZone, Weekday};

/// Milliseconds in an hour.
pub const HOUR_MS: i64 = 3_600_000;

/// Milliseconds in a (non-DST) day.
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Calendar date of `ms` in `tz`.
pub fn local_date<Tz: TimeZone>(tz: &Tz, ms: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(ms)
        .unwrap_or_default()
        .with_timezone(tz)
        .date_naive()
}

/// Converts a local date at midnight to a timestamp.
/// Handles DST ambiguity by picking the earlier time.
pub fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let at = |hour| {
        NaiveTime::from_hms_opt(hour, 0, 0)
            .and_then(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
            .map(|dt| dt.timestamp_millis())
    };
    // A DST spring-forward gap at midnight is rare but possible; 1am exists.
    at(0)
        .or_else(|| at(1))
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

/// 00:00:00.000 of the day containing `ms`.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, ms: i64) -> i64 {
    midnight(tz, local_date(tz, ms))
}

/// 23:59:59.999 of the day containing `ms`.
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, ms: i64) -> i64 {
    end_of_date(tz, local_date(tz, ms))
}

/// Last millisecond of `date`.
pub fn end_of_date<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    date.succ_opt()
        .map_or_else(|| midnight(tz, date) + DAY_MS, |next| midnight(tz, next))
        - 1
}

/// Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    last_of_month(date).day()
}

/// Moves `date` by `offset` calendar months, clamping the day to the target month.
pub fn shift_months(date: NaiveDate, offset: i32) -> NaiveDate {
    let months = Months::new(offset.unsigned_abs());
    let shifted = if offset >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    shifted.unwrap_or(date)
}

/// Moves `date` by `offset` days.
pub fn shift_days(date: NaiveDate, offset: i64) -> NaiveDate {
    date.checked_add_signed(chrono::Duration::days(offset))
        .unwrap_or(date)
}
