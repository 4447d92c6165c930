//! Statistics over the session log.
//!
//! Everything here only reads sessions. Totals count focus sessions whose
//! `endedAt` falls inside the window; charts bucket the same sessions by
//! hour, day, week or month depending on the period.

pub mod chart;
pub mod labels;
mod period;

use chrono::{Datelike, TimeZone};
use serde::Serialize;

pub use chart::{ChartBar, Granularity};
pub use period::{DateRange, StatsPeriod, StatsQuery};

use crate::calendar::{DAY_MS, first_of_month, last_of_month, local_date, start_of_day};
use crate::format::secs_to_minutes;
use crate::session::Session;
use crate::types::Phase;

/// Focus minutes and session count for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub minutes: i64,
    pub sessions: usize,
}

impl Totals {
    pub const fn is_empty(&self) -> bool {
        self.sessions == 0
    }
}

/// Everything a statistics view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub period: StatsPeriod,
    pub offset: i32,
    pub from: i64,
    pub to: i64,
    pub title: String,
    pub today: Totals,
    pub last_seven_days: Totals,
    pub current: Totals,
    pub chart: Vec<ChartBar>,
}

fn focus_in(sessions: &[Session], range: DateRange) -> impl Iterator<Item = &Session> {
    sessions
        .iter()
        .filter(move |s| s.phase == Phase::Focus && range.contains(s.ended_at))
}

/// Totals for focus sessions ending inside `range`.
pub fn totals(sessions: &[Session], range: DateRange) -> Totals {
    let (secs, count) = focus_in(sessions, range)
        .fold((0_i64, 0_usize), |(secs, count), s| {
            (secs.saturating_add(s.duration_sec), count + 1)
        });
    Totals {
        minutes: secs_to_minutes(secs),
        sessions: count,
    }
}

/// Computes totals and the chart for `query` as seen at `now` in `tz`.
pub fn compute_stats<Tz: TimeZone>(
    sessions: &[Session],
    query: &StatsQuery,
    now_ms: i64,
    tz: &Tz,
) -> StatsReport {
    let range = query.resolve(now_ms, tz);
    let first = local_date(tz, range.from);
    let last = local_date(tz, range.to);

    let today = totals(
        sessions,
        DateRange {
            from: start_of_day(tz, now_ms),
            to: now_ms,
        },
    );
    let last_seven_days = totals(
        sessions,
        DateRange {
            from: now_ms - 7 * DAY_MS,
            to: now_ms,
        },
    );
    let current = totals(sessions, range);

    let (title, chart) = match query.period() {
        StatsPeriod::Day => {
            // Overlap splitting needs sessions that merely touch the day.
            let touching = sessions.iter().filter(|s| {
                s.phase == Phase::Focus && s.ended_at >= range.from && s.started_at <= range.to
            });
            (labels::day_title(first), chart::hourly(touching, first, tz))
        }
        StatsPeriod::Week => (
            labels::week_title(first, last),
            chart::by_date(
                focus_in(sessions, range),
                first,
                last,
                Granularity::Day,
                tz,
                labels::weekday,
            ),
        ),
        StatsPeriod::Month => (
            labels::month_title(first),
            chart::by_date(
                focus_in(sessions, range),
                first_of_month(first),
                last_of_month(first),
                Granularity::Day,
                tz,
                labels::day_of_month,
            ),
        ),
        StatsPeriod::Year => (
            first.year().to_string(),
            chart::by_date(
                focus_in(sessions, range),
                first,
                last,
                Granularity::Month,
                tz,
                |d| labels::month(d, false),
            ),
        ),
        StatsPeriod::Custom => {
            let span = (last - first).num_days() + 1;
            let granularity = Granularity::for_span(span);
            let with_year = first.year() != last.year();
            let chart = match granularity {
                Granularity::Day | Granularity::Week => chart::by_date(
                    focus_in(sessions, range),
                    first,
                    last,
                    granularity,
                    tz,
                    labels::day_month,
                ),
                Granularity::Month => chart::by_date(
                    focus_in(sessions, range),
                    first,
                    last,
                    granularity,
                    tz,
                    |d| labels::month(d, with_year),
                ),
            };
            (labels::range_title(first, last), chart)
        }
    };

    tracing::debug!(
        period = %query.period(),
        offset = query.offset(),
        sessions = current.sessions,
        buckets = chart.len(),
        "computed statistics"
    );

    StatsReport {
        period: query.period(),
        offset: query.offset(),
        from: range.from,
        to: range.to,
        title,
        today,
        last_seven_days,
        current,
        chart,
    }
}
