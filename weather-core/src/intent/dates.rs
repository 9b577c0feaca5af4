use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use std::sync::LazyLock;

use super::lexicon::month_number;

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<month>[a-z]{3,9})\.?\s*(?P<day>\d{1,2})(?:st|nd|rd|th)?\b")
        .expect("month/day pattern must compile")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<day>monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday pattern must compile")
});

/// The date a piece of text refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMention {
    pub date: NaiveDate,
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// Set for "weekend" and weekday names, which make the query date-driven.
    pub names_day: bool,
}

/// Reads a date out of lowercased text; defaults to `today`.
pub fn parse_date(lower: &str, today: NaiveDate) -> DateMention {
    let mut mention = DateMention { date: today, range: None, names_day: false };

    if lower.contains("tomorrow") {
        mention.date = add_days(today, 1);
    } else if lower.contains("weekend") {
        mention.range = Some(upcoming_weekend(today));
        mention.names_day = true;
    } else if lower.contains("next week") {
        mention.date = add_days(today, 7);
    } else if let Some(date) = month_day(lower, today.year()) {
        mention.date = date;
    } else if let Some(weekday) = weekday_name(lower) {
        mention.date = next_weekday(today, weekday);
        mention.names_day = true;
    }

    mention
}

/// Saturday and Sunday of the coming weekend; on a weekend day, the next one.
pub fn upcoming_weekend(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from_sunday = today.weekday().num_days_from_sunday() as i64;
    let mut to_saturday = 6 - from_sunday;
    if to_saturday <= 0 {
        to_saturday += 7;
    }
    let saturday = add_days(today, to_saturday as u64);
    (saturday, add_days(saturday, 1))
}

/// First `weekday` strictly after `today`.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    add_days(today, if ahead == 0 { 7 } else { ahead as u64 })
}

fn month_day(lower: &str, year: i32) -> Option<NaiveDate> {
    MONTH_DAY.captures_iter(lower).find_map(|caps| {
        let month = month_number(&caps["month"])?;
        let day: u32 = caps["day"].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn weekday_name(lower: &str) -> Option<Weekday> {
    let caps = WEEKDAY.captures(lower)?;
    caps["day"].parse::<Weekday>().ok()
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    // 2026-10-14 is a Wednesday.
    const WED: (i32, u32, u32) = (2026, 10, 14);

    fn wednesday() -> NaiveDate {
        date(WED.0, WED.1, WED.2)
    }

    #[test]
    fn tomorrow_is_next_day() {
        let m = parse_date("weather tomorrow in oslo", wednesday());
        assert_eq!(m.date, date(2026, 10, 15));
        assert!(m.range.is_none());
        assert!(!m.names_day);
    }

    #[test]
    fn weekend_from_midweek() {
        let m = parse_date("this weekend in paris", wednesday());
        assert_eq!(m.range, Some((date(2026, 10, 17), date(2026, 10, 18))));
        assert!(m.names_day);
        assert_eq!(m.date, wednesday());
    }

    #[test]
    fn weekend_on_a_weekend_means_the_next_one() {
        assert_eq!(upcoming_weekend(date(2026, 10, 17)), (date(2026, 10, 24), date(2026, 10, 25)));
        assert_eq!(upcoming_weekend(date(2026, 10, 18)), (date(2026, 10, 24), date(2026, 10, 25)));
    }

    #[test]
    fn month_and_day_in_current_year() {
        assert_eq!(parse_date("what about sep 3", wednesday()).date, date(2026, 9, 3));
        assert_eq!(parse_date("on december 25th?", wednesday()).date, date(2026, 12, 25));
    }

    #[test]
    fn invalid_month_day_falls_back_to_today() {
        assert_eq!(parse_date("feb 30 in rome", wednesday()).date, wednesday());
        assert_eq!(parse_date("room 12 please", wednesday()).date, wednesday());
    }

    #[test]
    fn weekday_names_point_forward() {
        let m = parse_date("how is friday looking", wednesday());
        assert_eq!(m.date, date(2026, 10, 16));
        assert!(m.names_day);
        assert_eq!(next_weekday(wednesday(), Weekday::Wed), date(2026, 10, 21));
    }

    #[test]
    fn next_week_adds_seven_days() {
        assert_eq!(parse_date("next week in lahore", wednesday()).date, date(2026, 10, 21));
    }
}
