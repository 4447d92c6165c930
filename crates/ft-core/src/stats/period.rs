//! Period selection and boundary resolution.

use std::fmt;

use chrono::{Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::calendar::{
    end_of_date, first_of_month, last_of_month, local_date, midnight, monday_of, shift_days,
    shift_months, start_of_day,
};
use crate::types::ValidationError;

/// The calendar window statistics are aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Day,
    #[default]
    Week,
    Month,
    Year,
    Custom,
}

impl StatsPeriod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatsPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "custom" => Ok(Self::Custom),
            _ => Err(ValidationError::InvalidValue {
                field: "period",
                value: s.to_string(),
            }),
        }
    }
}

/// Inclusive millisecond range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

impl DateRange {
    pub const fn contains(&self, ms: i64) -> bool {
        ms >= self.from && ms <= self.to
    }

    /// The whole local days `[start of first, end of last]`.
    pub fn of_dates<Tz: TimeZone>(tz: &Tz, first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            from: midnight(tz, first),
            to: end_of_date(tz, last),
        }
    }
}

/// A validated statistics request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsQuery {
    period: StatsPeriod,
    offset: i32,
    custom: Option<DateRange>,
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self {
            period: StatsPeriod::Week,
            offset: 0,
            custom: None,
        }
    }
}

impl StatsQuery {
    /// A calendar period shifted by `offset` units; `0` is the current one.
    ///
    /// Offsets past the current period are rejected. For `Custom` the offset
    /// is ignored and the range defaults to the last seven days.
    pub fn new(period: StatsPeriod, offset: i32) -> Result<Self, ValidationError> {
        if offset > 0 {
            return Err(ValidationError::FutureOffset { offset });
        }
        Ok(Self {
            period,
            offset: if period == StatsPeriod::Custom { 0 } else { offset },
            custom: None,
        })
    }

    /// An explicit inclusive range.
    pub fn custom(from: i64, to: i64) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedRange { from, to });
        }
        Ok(Self {
            period: StatsPeriod::Custom,
            offset: 0,
            custom: Some(DateRange { from, to }),
        })
    }

    pub const fn period(&self) -> StatsPeriod {
        self.period
    }

    pub const fn offset(&self) -> i32 {
        self.offset
    }

    /// Whether a later period can be viewed.
    pub fn can_go_next(&self) -> bool {
        self.period != StatsPeriod::Custom && self.offset < 0
    }

    /// The query for the previous period. Custom ranges have none.
    pub fn previous(&self) -> Option<Self> {
        (self.period != StatsPeriod::Custom).then(|| Self {
            offset: self.offset.saturating_sub(1),
            ..*self
        })
    }

    /// The query for the next period, if it is not in the future.
    pub fn next(&self) -> Option<Self> {
        self.can_go_next().then(|| Self {
            offset: self.offset + 1,
            ..*self
        })
    }

    /// Resolves the window relative to `now` in `tz`.
    pub fn resolve<Tz: TimeZone>(&self, now_ms: i64, tz: &Tz) -> DateRange {
        let today = local_date(tz, now_ms);
        let offset = i64::from(self.offset);
        match self.period {
            StatsPeriod::Day => {
                let day = shift_days(today, offset);
                DateRange::of_dates(tz, day, day)
            }
            StatsPeriod::Week => {
                let monday = shift_days(monday_of(today), offset * 7);
                DateRange::of_dates(tz, monday, shift_days(monday, 6))
            }
            StatsPeriod::Month => {
                let first = shift_months(first_of_month(today), self.offset);
                DateRange::of_dates(tz, first, last_of_month(first))
            }
            StatsPeriod::Year => {
                let year = today.year() + self.offset;
                let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
                let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
                DateRange::of_dates(tz, first, last)
            }
            StatsPeriod::Custom => match self.custom {
                Some(range) => DateRange {
                    from: start_of_day(tz, range.from),
                    to: range.to,
                },
                None => DateRange::of_dates(tz, shift_days(today, -6), today),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, Utc};

    use super::*;

    fn ts(s: &str) -> i64 {
        DateTime::parse_from_rfc3339(s).unwrap().timestamp_millis()
    }

    // Wednesday.
    const NOW: &str = "2025-02-19T10:00:00Z";

    #[test]
    fn positive_offset_is_rejected() {
        assert_eq!(
            StatsQuery::new(StatsPeriod::Week, 1).unwrap_err(),
            ValidationError::FutureOffset { offset: 1 }
        );
        assert!(StatsQuery::new(StatsPeriod::Week, 0).is_ok());
    }

    #[test]
    fn inverted_custom_range_is_rejected() {
        assert!(StatsQuery::custom(10, 5).is_err());
        assert!(StatsQuery::custom(5, 5).is_ok());
    }

    #[test]
    fn week_is_monday_to_sunday() {
        let range = StatsQuery::new(StatsPeriod::Week, 0)
            .unwrap()
            .resolve(ts(NOW), &Utc);
        assert_eq!(range.from, ts("2025-02-17T00:00:00Z"));
        assert_eq!(range.to, ts("2025-02-23T23:59:59.999Z"));
    }

    #[test]
    fn previous_week_and_month() {
        let week = StatsQuery::new(StatsPeriod::Week, -1)
            .unwrap()
            .resolve(ts(NOW), &Utc);
        assert_eq!(week.from, ts("2025-02-10T00:00:00Z"));

        let month = StatsQuery::new(StatsPeriod::Month, -2)
            .unwrap()
            .resolve(ts(NOW), &Utc);
        assert_eq!(month.from, ts("2024-12-01T00:00:00Z"));
        assert_eq!(month.to, ts("2024-12-31T23:59:59.999Z"));
    }

    #[test]
    fn year_and_day_bounds() {
        let year = StatsQuery::new(StatsPeriod::Year, 0)
            .unwrap()
            .resolve(ts(NOW), &Utc);
        assert_eq!(year.from, ts("2025-01-01T00:00:00Z"));
        assert_eq!(year.to, ts("2025-12-31T23:59:59.999Z"));

        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let day = StatsQuery::new(StatsPeriod::Day, -1)
            .unwrap()
            .resolve(ts(NOW), &tz);
        assert_eq!(day.from, ts("2025-02-17T22:00:00Z"));
        assert_eq!(day.to, ts("2025-02-18T21:59:59.999Z"));
    }

    #[test]
    fn custom_snaps_start_to_midnight() {
        let query =
            StatsQuery::custom(ts("2025-02-01T15:00:00Z"), ts("2025-02-05T12:00:00Z")).unwrap();
        let range = query.resolve(ts(NOW), &Utc);
        assert_eq!(range.from, ts("2025-02-01T00:00:00Z"));
        assert_eq!(range.to, ts("2025-02-05T12:00:00Z"));
    }

    #[test]
    fn custom_without_range_is_last_seven_days() {
        let range = StatsQuery::new(StatsPeriod::Custom, -3)
            .unwrap()
            .resolve(ts(NOW), &Utc);
        assert_eq!(range.from, ts("2025-02-13T00:00:00Z"));
        assert_eq!(range.to, ts("2025-02-19T23:59:59.999Z"));
    }

    #[test]
    fn navigation_stops_at_current_period() {
        let current = StatsQuery::new(StatsPeriod::Month, 0).unwrap();
        assert!(!current.can_go_next());
        assert!(current.next().is_none());

        let previous = current.previous().unwrap();
        assert_eq!(previous.offset(), -1);
        assert_eq!(previous.next(), Some(current));

        let custom = StatsQuery::custom(0, 1).unwrap();
        assert!(custom.previous().is_none());
    }

    #[test]
    fn period_parses_from_str() {
        assert_eq!("year".parse::<StatsPeriod>().unwrap(), StatsPeriod::Year);
        assert!("fortnight".parse::<StatsPeriod>().is_err());
    }
}
