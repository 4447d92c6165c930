//! Bucketed time series for charts.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use super::labels;
use crate::calendar::{
    HOUR_MS, first_of_month, local_date, midnight, monday_of, shift_days, shift_months,
};
use crate::format::round1;
use crate::session::Session;

/// Custom ranges up to this many days get one bucket per day.
pub const DAILY_MAX_DAYS: i64 = 31;

/// Custom ranges up to this many days get one bucket per week.
pub const WEEKLY_MAX_DAYS: i64 = 92;

/// One chart slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub minutes: f64,
}

/// Bucket width for date-keyed charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Granularity for a custom range spanning `days` calendar days.
    pub const fn for_span(days: i64) -> Self {
        if days <= DAILY_MAX_DAYS {
            Self::Day
        } else if days <= WEEKLY_MAX_DAYS {
            Self::Week
        } else {
            Self::Month
        }
    }

    /// First date of the bucket containing `date`.
    fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => monday_of(date),
            Self::Month => first_of_month(date),
        }
    }

    fn step(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => shift_days(date, 1),
            Self::Week => shift_days(date, 7),
            Self::Month => shift_months(date, 1),
        }
    }
}

/// Minutes each session overlaps each hour of `day`.
///
/// Sessions are split across hours, so a run from 23:30 to 00:30 puts half
/// into the last hour of one day and half into the first hour of the next.
/// Hours are counted from local midnight in fixed 60-minute steps.
pub fn hourly<'a, Tz: TimeZone>(
    sessions: impl IntoIterator<Item = &'a Session>,
    day: NaiveDate,
    tz: &Tz,
) -> Vec<ChartBar> {
    let day_start = midnight(tz, day);
    let mut overlap_ms = [0_i64; 24];
    for session in sessions {
        for (h, slot) in (0_i64..).zip(overlap_ms.iter_mut()) {
            let hour_start = day_start + h * HOUR_MS;
            let hour_end = hour_start + HOUR_MS;
            let overlap = session
                .ended_at
                .min(hour_end)
                .saturating_sub(session.started_at.max(hour_start));
            *slot = slot.saturating_add(overlap.max(0));
        }
    }
    (0_u32..)
        .zip(overlap_ms)
        .map(|(h, ms)| ChartBar {
            label: labels::hour(h),
            minutes: ms_to_minutes(ms),
        })
        .collect()
}

/// Sums whole session durations into date buckets keyed by the local date of
/// `endedAt`. Every bucket between `first` and `last` is present.
pub fn by_date<'a, Tz: TimeZone>(
    sessions: impl IntoIterator<Item = &'a Session>,
    first: NaiveDate,
    last: NaiveDate,
    granularity: Granularity,
    tz: &Tz,
    label: impl Fn(NaiveDate) -> String,
) -> Vec<ChartBar> {
    let mut starts = Vec::new();
    let mut cursor = granularity.bucket_start(first);
    while cursor <= last {
        starts.push(cursor);
        let next = granularity.step(cursor);
        if next <= cursor {
            break;
        }
        cursor = next;
    }

    let mut secs = vec![0_i64; starts.len()];
    for session in sessions {
        let key = granularity.bucket_start(local_date(tz, session.ended_at));
        if let Ok(idx) = starts.binary_search(&key) {
            secs[idx] = secs[idx].saturating_add(session.duration_sec);
        }
    }

    starts
        .into_iter()
        .zip(secs)
        .map(|(start, secs)| ChartBar {
            label: label(start),
            minutes: ms_to_minutes(secs.saturating_mul(1000)),
        })
        .collect()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "real bucket totals are far below 2^52 ms; larger ones only lose precision"
)]
fn ms_to_minutes(ms: i64) -> f64 {
    round1(ms as f64 / 60_000.0)
}
