//! Calendar-date arithmetic on the proleptic Gregorian calendar.
//!
//! [`CalendarDate`] is an always-normalized `(year, month, day)` value with a
//! zero-based month (0 = January). Every operation here is total: out-of-range
//! inputs are rolled over, month and year shifts clamp the day of the month,
//! and dates beyond chrono's supported range saturate at its limits.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::OccurrenceError;

/// Returns `true` for Gregorian leap years.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month0` (0 = January) of `year`.
///
/// `month0` values outside `0..12` are taken modulo 12.
pub fn last_day_of_month(year: i32, month0: u32) -> u32 {
    match month0 % 12 {
        1 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Maps a Sunday-based day-of-week number (0 = Sunday ... 6 = Saturday).
pub fn weekday_from_sunday(day_of_week: i32) -> Option<Weekday> {
    match day_of_week {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// A raw, possibly out-of-range year/month/day triple.
///
/// This is what callers and deserializers hand in before normalization. The
/// month is zero-based like [`CalendarDate`]'s. In text and JSON it is the same
/// `YYYY-MM-DD` string as a `CalendarDate`, read without normalizing, so
/// `"2021-02-29"` stays an invalid triple. JSON also accepts a
/// `{year, month, day}` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateParts {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl DateParts {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Whether the triple already names a real date, i.e. normalizing it
    /// would not change anything.
    pub fn is_valid(&self) -> bool {
        if !(0..12).contains(&self.month) || self.day < 1 {
            return false;
        }
        // month is in range so the cast is lossless.
        self.day as u32 <= last_day_of_month(self.year, self.month as u32)
            && NaiveDate::from_ymd_opt(self.year, self.month as u32 + 1, self.day as u32).is_some()
    }
}

impl From<CalendarDate> for DateParts {
    fn from(date: CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0() as i32,
            day: date.day() as i32,
        }
    }
}

/// Result of [`CalendarDate::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized {
    pub date: CalendarDate,
    /// `true` when any of year, month or day had to be rolled over.
    pub changed: bool,
}

/// A valid Gregorian calendar date with no time or timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Strict constructor: `None` unless `(year, month0, day)` is a real date.
    pub fn new(year: i32, month0: u32, day: u32) -> Option<Self> {
        if month0 >= 12 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month0 + 1, day).map(Self)
    }

    /// Rolls over-range months into the year, then over-range days into
    /// neighbouring months, the way `(y, m, 1) + (day - 1)` days would.
    ///
    /// `normalize(normalize(x).date)` never reports a change.
    pub fn normalize(parts: DateParts) -> Normalized {
        let total_months = i64::from(parts.year) * 12 + i64::from(parts.month);
        let first = CalendarDate(saturating_ymd(
            total_months.div_euclid(12),
            total_months.rem_euclid(12) as u32,
            1,
        ));
        let date = first.add_days(i64::from(parts.day) - 1);
        Normalized {
            date,
            changed: DateParts::from(date) != parts,
        }
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Zero-based month, 0 = January.
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    /// One-based day of the month.
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Day of the week, 0 = Sunday.
    pub fn day_of_week(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn last_day_of_month(&self) -> u32 {
        last_day_of_month(self.year(), self.month0())
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }

    pub fn add_days(&self, days: i64) -> Self {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        Self(shifted.unwrap_or(if days >= 0 {
            NaiveDate::MAX
        } else {
            NaiveDate::MIN
        }))
    }

    /// Shifts by whole months, pinning the day to the destination month's
    /// last day when it does not exist there (Jan 31 + 1 month = Feb 28/29).
    pub fn add_months(&self, months: i64) -> Self {
        if months == 0 {
            return *self;
        }
        let total = (i64::from(self.year()) * 12 + i64::from(self.month0())).saturating_add(months);
        let year = total.div_euclid(12);
        let month0 = total.rem_euclid(12) as u32;
        let day = match i32::try_from(year) {
            Ok(year) => self.day().min(last_day_of_month(year, month0)),
            Err(_) => 1,
        };
        Self(saturating_ymd(year, month0, day))
    }

    /// Shifts by whole years. Feb 29 becomes Feb 28 in non-leap years.
    pub fn add_years(&self, years: i64) -> Self {
        self.add_months(years.saturating_mul(12))
    }

    /// Same month, with the day clamped into `1..=last_day_of_month`.
    pub fn with_day(&self, day: i64) -> Self {
        let day = day.clamp(1, i64::from(self.last_day_of_month())) as u32;
        Self(saturating_ymd(i64::from(self.year()), self.month0(), day))
    }

    /// The `n`-th `weekday` of this date's month.
    ///
    /// `n > 0` counts forward from the first of the month, `n < 0` counts
    /// backward from the last day. The result is not confined to the month:
    /// a fifth Saturday may land in the following month.
    pub fn nth_weekday_of_month(&self, n: i32, weekday: Weekday) -> Self {
        if n >= 0 {
            self.with_day(1).nth_weekday_from(n, weekday)
        } else {
            self.with_day(i64::from(self.last_day_of_month()))
                .nth_weekday_back_from(n, weekday)
        }
    }

    /// The `n`-th `weekday` of this date's year, counting from Jan 1
    /// (`n > 0`) or back from Dec 31 (`n < 0`).
    pub fn nth_weekday_of_year(&self, n: i32, weekday: Weekday) -> Self {
        let year = i64::from(self.year());
        if n >= 0 {
            Self(saturating_ymd(year, 0, 1)).nth_weekday_from(n, weekday)
        } else {
            Self(saturating_ymd(year, 11, 31)).nth_weekday_back_from(n, weekday)
        }
    }

    fn nth_weekday_from(&self, n: i32, weekday: Weekday) -> Self {
        let delta = (i64::from(weekday.num_days_from_sunday()) - i64::from(self.day_of_week()))
            .rem_euclid(7);
        self.add_days(delta + (i64::from(n) - 1) * 7)
    }

    fn nth_weekday_back_from(&self, n: i32, weekday: Weekday) -> Self {
        let delta = (i64::from(self.day_of_week()) - i64::from(weekday.num_days_from_sunday()))
            .rem_euclid(7);
        self.add_days(-delta - (i64::from(n.unsigned_abs()) - 1) * 7)
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: CalendarDate) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    pub fn closest_sunday_on_or_before(&self) -> Self {
        self.add_days(-i64::from(self.day_of_week()))
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month0() + 1,
            self.day()
        )
    }
}

/// Parses `YYYY-MM-DD` with a one-based month and zero padding optional.
/// Parts are kept as written, out of range or not.
impl FromStr for DateParts {
    type Err = OccurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OccurrenceError::DateParse(s.to_string());
        let text = s.trim();
        let (negative, text) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut parts = text.split('-');
        let mut next = || -> Result<i32, OccurrenceError> {
            parts
                .next()
                .and_then(|p| p.trim().parse::<i32>().ok())
                .ok_or_else(invalid)
        };
        let year = next()?;
        let month = next()?;
        let day = next()?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let year = if negative { -year } else { year };
        Ok(DateParts::new(year, month.saturating_sub(1), day))
    }
}

/// Written as `YYYY-MM-DD` when the triple is a real date, otherwise as the
/// raw `{year, month, day}` object.
impl Serialize for DateParts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_valid() {
            return serializer.collect_str(&CalendarDate::normalize(*self).date);
        }
        let mut state = serializer.serialize_struct("DateParts", 3)?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("month", &self.month)?;
        state.serialize_field("day", &self.day)?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDateParts {
    Text(String),
    Fields { year: i32, month: i32, day: i32 },
}

impl<'de> Deserialize<'de> for DateParts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawDateParts::deserialize(deserializer)? {
            RawDateParts::Text(text) => text.parse().map_err(serde::de::Error::custom),
            RawDateParts::Fields { year, month, day } => Ok(DateParts::new(year, month, day)),
        }
    }
}

/// Parses `YYYY-MM-DD` like [`DateParts`], then normalizes out-of-range parts
/// (`2021-02-29` is `2021-03-01`).
impl FromStr for CalendarDate {
    type Err = OccurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s.parse()?).date)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Builds a date from an already-valid month/day, saturating when the year
/// is outside chrono's range.
fn saturating_ymd(year: i64, month0: u32, day: u32) -> NaiveDate {
    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month0 + 1, day))
        .unwrap_or(if year < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}
