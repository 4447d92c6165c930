//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{NaiveDate, TimeZone};
use ft_core::StatsQuery;
use ft_core::calendar::{end_of_date, local_date, midnight, shift_days};
use regex::Regex;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative dates (~1000 years in days).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// Days a custom range spans when only one end is given.
const DEFAULT_CUSTOM_DAYS: i64 = 7;

/// Parse a date string relative to `today`.
///
/// Supports:
/// - ISO dates: "2025-02-17"
/// - "today" and "yesterday"
/// - Relative: "3 days ago", "2 weeks ago"
pub fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return Ok(shift_days(today, -1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        anyhow::bail!("Invalid date: {s}. Use YYYY-MM-DD (e.g., 2025-02-17) or relative (e.g., '3 days ago')");
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date too far back: {n} {}", &caps[2]);
    }

    Ok(shift_days(today, -n * days_per_unit))
}

/// Builds a custom-range query covering whole local days.
///
/// A missing `to` means today; a missing `from` means the week ending at `to`.
pub fn custom_query<Tz: TimeZone>(
    from: Option<&str>,
    to: Option<&str>,
    now_ms: i64,
    tz: &Tz,
) -> anyhow::Result<StatsQuery> {
    let today = local_date(tz, now_ms);
    let last = to.map_or(Ok(today), |s| parse_date(s, today))?;
    let first = from.map_or_else(
        || Ok(shift_days(last, 1 - DEFAULT_CUSTOM_DAYS)),
        |s| parse_date(s, today),
    )?;
    let query = StatsQuery::custom(midnight(tz, first), end_of_date(tz, last))
        .with_context(|| format!("invalid range {first} to {last}"))?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        let today = day(2025, 2, 19);
        assert_eq!(parse_date("2025-02-03", today).unwrap(), day(2025, 2, 3));
    }

    #[test]
    fn test_parse_relative_dates() {
        let today = day(2025, 2, 19);
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("yesterday", today).unwrap(), day(2025, 2, 18));
        assert_eq!(parse_date("1 day ago", today).unwrap(), day(2025, 2, 18));
        assert_eq!(parse_date("3 days ago", today).unwrap(), day(2025, 2, 16));
        assert_eq!(parse_date("2 weeks ago", today).unwrap(), day(2025, 2, 5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let today = day(2025, 2, 19);
        assert!(parse_date("last tuesday", today).is_err());
        assert!(parse_date("2025-13-01", today).is_err());
        assert!(parse_date("99999999 weeks ago", today).is_err());
    }

    #[test]
    fn test_custom_query_covers_whole_days() {
        let now = Utc.with_ymd_and_hms(2025, 2, 19, 15, 0, 0).unwrap().timestamp_millis();
        let query = custom_query(Some("2025-02-10"), Some("2025-02-12"), now, &Utc).unwrap();
        let range = query.resolve(now, &Utc);

        let from = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap().timestamp_millis();
        let to = Utc.with_ymd_and_hms(2025, 2, 13, 0, 0, 0).unwrap().timestamp_millis() - 1;
        assert_eq!((range.from, range.to), (from, to));
    }

    #[test]
    fn test_custom_query_defaults_to_last_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 2, 19, 15, 0, 0).unwrap().timestamp_millis();
        let range = custom_query(None, None, now, &Utc).unwrap().resolve(now, &Utc);
        assert_eq!(local_date(&Utc, range.from), day(2025, 2, 13));
        assert_eq!(local_date(&Utc, range.to), day(2025, 2, 19));
    }

    #[test]
    fn test_custom_query_rejects_inverted_range() {
        let now = Utc.with_ymd_and_hms(2025, 2, 19, 15, 0, 0).unwrap().timestamp_millis();
        assert!(custom_query(Some("2025-02-12"), Some("2025-02-10"), now, &Utc).is_err());
    }
}
