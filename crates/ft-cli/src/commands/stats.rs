//! Stats command for focus totals and charts.
//!
//! Renders `ft stats` for day, week, month, year and custom periods in
//! human-readable or JSON form. Periods are resolved in the local time zone.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use ft_core::stats::{ChartBar, Totals};
use ft_core::{Clock, StatsPeriod, StatsQuery, StatsReport};
use ft_db::KvStore;
use serde::Serialize;

use super::util::custom_query;
use crate::app::FocusApp;

/// Placeholder for a total with no sessions.
const EMPTY_TOTAL: &str = "—";

/// Width of the chart bars in cells.
const BAR_CELLS: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonStats<'a> {
    generated_at: String,
    timezone: String,
    #[serde(flatten)]
    report: &'a StatsReport,
}

/// Builds the query for the command-line arguments. Either end of a range
/// turns the query into a custom one.
pub fn build_query<Tz: TimeZone>(
    period: StatsPeriod,
    offset: i32,
    from: Option<&str>,
    to: Option<&str>,
    now_ms: i64,
    tz: &Tz,
) -> Result<StatsQuery> {
    if from.is_some() || to.is_some() {
        return custom_query(from, to, now_ms, tz);
    }
    StatsQuery::new(period, offset).context("invalid statistics period")
}

/// Formats whole minutes as "Xh Ym" if >= 1 hour, "Xm" otherwise.
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours >= 1 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

/// Generates a 10-cell bar. Non-zero values under 5% of `max` still get a
/// single cell.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the ratio is clamped to [0, 1] before scaling"
)]
pub fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "░".repeat(BAR_CELLS);
    }
    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = if ratio < 0.05 && value > 0.0 {
        1
    } else {
        (ratio * 10.0).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

fn totals_cell(totals: &Totals) -> String {
    if totals.is_empty() {
        return EMPTY_TOTAL.to_string();
    }
    let noun = if totals.sessions == 1 { "session" } else { "sessions" };
    format!("{} ({} {noun})", format_minutes(totals.minutes), totals.sessions)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "bucket minutes are bounded by the bucket length"
)]
fn bar_value(bar: &ChartBar) -> String {
    if bar.minutes <= 0.0 {
        EMPTY_TOTAL.to_string()
    } else {
        format_minutes(bar.minutes.round() as i64)
    }
}

/// Writes the human-readable report.
pub fn format_report<W: Write>(writer: &mut W, report: &StatsReport) -> std::io::Result<()> {
    writeln!(writer, "{} ({})", report.title, report.period)?;
    writeln!(writer)?;
    writeln!(writer, "  {:<13}{}", "Today", totals_cell(&report.today))?;
    writeln!(writer, "  {:<13}{}", "Last 7 days", totals_cell(&report.last_seven_days))?;
    writeln!(writer, "  {:<13}{}", "This period", totals_cell(&report.current))?;

    if report.chart.is_empty() {
        return Ok(());
    }
    writeln!(writer)?;
    let width = report
        .chart
        .iter()
        .map(|bar| bar.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = report.chart.iter().map(|bar| bar.minutes).fold(0.0, f64::max);
    for bar in &report.chart {
        writeln!(
            writer,
            "  {:<width$}  {}  {}",
            bar.label,
            progress_bar(bar.minutes, max),
            bar_value(bar)
        )?;
    }
    Ok(())
}

/// Writes the report as JSON, stamped with the generation time and zone.
pub fn format_report_json<W: Write>(
    writer: &mut W,
    report: &StatsReport,
    generated_at: DateTime<Utc>,
    timezone: String,
) -> Result<()> {
    let json = JsonStats {
        generated_at: generated_at.to_rfc3339(),
        timezone,
        report,
    };
    writeln!(writer, "{}", serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

/// Runs the stats command in the local time zone.
pub fn run<W: Write, S: KvStore, C: Clock>(
    writer: &mut W,
    app: &FocusApp<S, C>,
    query: &StatsQuery,
    json: bool,
) -> Result<()> {
    let report = app.stats(query, &Local);

    if json {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        let generated_at = DateTime::from_timestamp_millis(app.now()).unwrap_or_else(Utc::now);
        format_report_json(writer, &report, generated_at, timezone)?;
    } else {
        format_report(writer, &report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ft_core::session::SessionMeta;
    use ft_core::{Phase, Session, compute_stats};
    use insta::assert_snapshot;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().timestamp_millis()
    }

    fn focus(minutes: i64, ended_at: i64) -> Session {
        Session::record(Phase::Focus, minutes * 60, ended_at, &SessionMeta::default())
    }

    fn week_report() -> StatsReport {
        let sessions = vec![
            focus(60, at(2025, 2, 19, 14, 0)),
            Session::record(Phase::Break, 15 * 60, at(2025, 2, 19, 9, 20), &SessionMeta::default()),
            focus(30, at(2025, 2, 19, 9, 0)),
            focus(45, at(2025, 2, 17, 10, 0)),
        ];
        let now = at(2025, 2, 19, 15, 0);
        let query = StatsQuery::new(StatsPeriod::Week, 0).unwrap();
        compute_stats(&sessions, &query, now, &Utc)
    }

    fn render(report: &StatsReport) -> String {
        let mut output = Vec::new();
        format_report(&mut output, report).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(135), "2h 15m");
        assert_eq!(format_minutes(-5), "0m");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(10.0, 10.0), "██████████");
        assert_eq!(progress_bar(5.0, 10.0), "█████░░░░░");
        assert_eq!(progress_bar(0.1, 10.0), "█░░░░░░░░░");
        assert_eq!(progress_bar(0.0, 10.0), "░░░░░░░░░░");
        assert_eq!(progress_bar(3.0, 0.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_week_report() {
        assert_snapshot!(render(&week_report()), @r"
        17–23 Feb (week)

          Today        1h 30m (2 sessions)
          Last 7 days  2h 15m (3 sessions)
          This period  2h 15m (3 sessions)

          Mon 17  █████░░░░░  45m
          Tue 18  ░░░░░░░░░░  —
          Wed 19  ██████████  1h 30m
          Thu 20  ░░░░░░░░░░  —
          Fri 21  ░░░░░░░░░░  —
          Sat 22  ░░░░░░░░░░  —
          Sun 23  ░░░░░░░░░░  —
        ");
    }

    #[test]
    fn test_empty_totals_show_placeholder() {
        let now = at(2025, 2, 19, 15, 0);
        let query = StatsQuery::new(StatsPeriod::Day, -1).unwrap();
        let report = compute_stats(&[], &query, now, &Utc);
        let output = render(&report);

        assert!(output.starts_with("Tue 18 Feb (day)\n"));
        assert!(output.contains("  This period  —\n"));
        assert_eq!(output.matches("░░░░░░░░░░  —").count(), 24);
    }

    #[test]
    fn test_report_json() {
        let report = week_report();
        let mut output = Vec::new();
        format_report_json(
            &mut output,
            &report,
            Utc.with_ymd_and_hms(2025, 2, 19, 15, 0, 0).unwrap(),
            "UTC".to_string(),
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["generatedAt"], "2025-02-19T15:00:00+00:00");
        assert_eq!(json["timezone"], "UTC");
        assert_eq!(json["period"], "week");
        assert_eq!(json["title"], "17–23 Feb");
        assert_eq!(json["current"]["minutes"], 135);
        assert_eq!(json["current"]["sessions"], 3);
        assert_eq!(json["chart"].as_array().unwrap().len(), 7);
        assert_eq!(json["chart"][2]["minutes"], 90.0);
    }

    #[test]
    fn test_build_query_prefers_range() {
        let now = at(2025, 2, 19, 15, 0);
        let query = build_query(StatsPeriod::Month, -2, Some("2025-02-01"), None, now, &Utc).unwrap();
        assert_eq!(query.period(), StatsPeriod::Custom);

        let query = build_query(StatsPeriod::Month, -2, None, None, now, &Utc).unwrap();
        assert_eq!(query.period(), StatsPeriod::Month);
        assert_eq!(query.offset(), -2);

        assert!(build_query(StatsPeriod::Week, 1, None, None, now, &Utc).is_err());
    }
}
