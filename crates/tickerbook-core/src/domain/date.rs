use std::fmt::{Display, Formatter};

use time::{Date, Duration, Month, OffsetDateTime};

/// Calendar date in UTC, rendered as `dd-mm-yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(Date);

impl CalendarDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Converts provider epoch seconds to the UTC calendar date.
    pub fn from_epoch_seconds(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .ok()
            .map(|instant| Self(instant.date()))
    }

    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub fn date(self) -> Date {
        self.0
    }

    pub fn plus_days(self, days: i64) -> Self {
        self.0
            .checked_add(Duration::days(days))
            .map(Self)
            .unwrap_or(self)
    }

    /// Parses statement column headers: `mm/dd/yyyy`, `yyyy-mm-dd`,
    /// `dd-mm-yyyy`, or a bare fiscal year (taken as 31 December).
    pub fn parse_header(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() == 4 && value.chars().all(|ch| ch.is_ascii_digit()) {
            let year = value.parse().ok()?;
            return Self::from_ymd(year, 12, 31);
        }

        if let Some((month, day, year)) = split_three(value, '/') {
            return Self::from_ymd(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
        }

        let (first, second, third) = split_three(value, '-')?;
        if first.len() == 4 {
            Self::from_ymd(first.parse().ok()?, second.parse().ok()?, third.parse().ok()?)
        } else {
            Self::from_ymd(third.parse().ok()?, second.parse().ok()?, first.parse().ok()?)
        }
    }

    /// Parses long display dates such as `Oct 17, 2025`.
    pub fn parse_long(value: &str) -> Option<Self> {
        let mut parts = value
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|part| !part.is_empty());
        let month = month_from_abbreviation(parts.next()?)?;
        let day: u8 = parts.next()?.parse().ok()?;
        let year: i32 = parts.next()?.parse().ok()?;
        Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// `Oct 17, 2025`
    pub fn to_long_string(self) -> String {
        format!(
            "{} {:02}, {}",
            month_abbreviation(self.0.month()),
            self.0.day(),
            self.0.year()
        )
    }

    /// `2025-10-17`
    pub fn to_iso_string(self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{:04}",
            self.0.day(),
            u8::from(self.0.month()),
            self.0.year()
        )
    }
}

fn split_three(value: &str, separator: char) -> Option<(&str, &str, &str)> {
    let mut parts = value.split(separator);
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first.trim(), second.trim(), third.trim()))
}

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn month_from_abbreviation(value: &str) -> Option<Month> {
    let prefix = value.get(..3)?;
    MONTHS
        .iter()
        .copied()
        .find(|month| month_abbreviation(*month).eq_ignore_ascii_case(prefix))
}

/// Full English month name for a 1-based month number.
pub fn month_name(month: u8) -> Option<&'static str> {
    let month = Month::try_from(month).ok()?;
    Some(match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    })
}

/// Last day of a 1-based month in a non-leap reference year.
pub fn month_end_day(month: u8) -> Option<u8> {
    let month = Month::try_from(month).ok()?;
    Some(time::util::days_in_year_month(2023, month))
}
