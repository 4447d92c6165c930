//! English chart labels and period titles.

use chrono::{Datelike, NaiveDate};

/// Hour bucket label, `00`..`23`.
pub fn hour(h: u32) -> String {
    format!("{h:02}")
}

/// Week bucket label, `Mon 16`.
pub fn weekday(date: NaiveDate) -> String {
    date.format("%a %-d").to_string()
}

/// Month bucket label, day of month only.
pub fn day_of_month(date: NaiveDate) -> String {
    date.day().to_string()
}

/// Custom daily or weekly bucket label, `16 Feb`.
pub fn day_month(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

/// Year or custom monthly bucket label, `Feb` or `Feb 2025`.
pub fn month(date: NaiveDate, with_year: bool) -> String {
    if with_year {
        date.format("%b %Y").to_string()
    } else {
        date.format("%b").to_string()
    }
}

/// Week title, `16–22 Feb` or `27 Jan – 2 Feb` across a month boundary.
pub fn week_title(monday: NaiveDate, sunday: NaiveDate) -> String {
    if monday.month() == sunday.month() {
        format!("{}–{}", monday.day(), day_month(sunday))
    } else {
        format!("{} – {}", day_month(monday), day_month(sunday))
    }
}

/// Month title, full month name.
pub fn month_title(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// Day title, `Wed 19 Feb`.
pub fn day_title(date: NaiveDate) -> String {
    date.format("%a %-d %b").to_string()
}

/// Custom range title, `1 Feb – 5 Mar`, with years when they differ.
pub fn range_title(first: NaiveDate, last: NaiveDate) -> String {
    if first.year() == last.year() {
        format!("{} – {}", day_month(first), day_month(last))
    } else {
        format!(
            "{} {} – {} {}",
            day_month(first),
            first.year(),
            day_month(last),
            last.year()
        )
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::calendar::shift_days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bucket_labels() {
        assert_eq!(hour(7), "07");
        assert_eq!(weekday(date(2025, 2, 17)), "Mon 17");
        assert_eq!(day_of_month(date(2025, 2, 3)), "3");
        assert_eq!(day_month(date(2025, 2, 3)), "3 Feb");
        assert_eq!(month(date(2025, 2, 3), false), "Feb");
        assert_eq!(month(date(2025, 2, 3), true), "Feb 2025");
    }

    #[test]
    fn week_titles() {
        assert_eq!(week_title(date(2025, 2, 17), date(2025, 2, 23)), "17–23 Feb");
        assert_eq!(
            week_title(date(2025, 1, 27), date(2025, 2, 2)),
            "27 Jan – 2 Feb"
        );
    }

    #[test]
    fn other_titles() {
        assert_eq!(month_title(date(2025, 2, 1)), "February");
        assert_eq!(day_title(date(2025, 2, 19)), "Wed 19 Feb");
        assert_eq!(
            range_title(date(2024, 12, 20), date(2025, 1, 5)),
            "20 Dec 2024 – 5 Jan 2025"
        );
    }

    #[test]
    fn week_and_year_bucket_labels() {
        let monday = date(2025, 2, 17);
        let week: Vec<String> = (0..7).map(|i| weekday(shift_days(monday, i))).collect();
        assert_snapshot!(week.join("\n"), @r"
        Mon 17
        Tue 18
        Wed 19
        Thu 20
        Fri 21
        Sat 22
        Sun 23
        ");

        let year: Vec<String> = (1..=12)
            .map(|m| month(date(2025, m, 1), false))
            .collect();
        assert_snapshot!(year.join(" "), @"Jan Feb Mar Apr May Jun Jul Aug Sep Oct Nov Dec");
    }
}
