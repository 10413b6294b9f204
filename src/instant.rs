use chrono::{Datelike as _, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike as _};
use std::cmp::Ordering;
use std::convert::TryFrom;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Which fields of an [`Instant`] take part in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// Wall-clock time in the zone of the event being expanded.
///
/// `month` is zero based (0 = January). While a period is being expanded the
/// day may be out of range for its month (31 September, 29 February in a
/// common year); such values never reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Instant {
    pub fn from_naive(time: NaiveDateTime) -> Self {
        Instant {
            year: clamp_year(time.year().into()),
            month: time.month0() as u8,
            day: time.day() as u8,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        }
    }

    /// Midnight at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Instant {
            year: clamp_year(date.year().into()),
            month: date.month0() as u8,
            day: date.day() as u8,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// `None` when the date is not a real calendar date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(
            self.year.into(),
            u32::from(self.month) + 1,
            self.day.into(),
        )?;
        // seconds 60 and 61 roll over into the next minute
        let time = NaiveTime::from_hms_opt(
            self.hour.into(),
            self.minute.into(),
            self.second.min(59).into(),
        )?;
        let leap = i64::from(self.second.saturating_sub(59));

        Some(date.and_time(time) + Duration::seconds(leap))
    }

    /// The last second of the day, leap seconds included.
    pub fn end_of_day(mut self) -> Self {
        self.hour = 23;
        self.minute = 59;
        self.second = 61;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.month < 12 && self.day >= 1 && self.day <= days_in_month(self.year, self.month)
    }

    /// Moves by whole months. The day is left untouched and may end up
    /// invalid for the new month.
    pub fn add_months(&mut self, months: i64) {
        let total = i64::from(self.year) * 12 + i64::from(self.month) + months;
        self.year = clamp_year(total.div_euclid(12));
        self.month = total.rem_euclid(12) as u8;
    }

    /// Moves by whole days, carrying into months and years. An invalid day
    /// is carried forward first, so 30 February + 0 is 1 or 2 March.
    pub fn add_days(&mut self, days: i64) {
        let day_number = self.day_number().saturating_add(days);
        self.set_day_number(day_number);
    }

    pub fn add_hours(&mut self, hours: i64) {
        self.add_seconds(hours.saturating_mul(60 * 60));
    }

    pub fn add_minutes(&mut self, minutes: i64) {
        self.add_seconds(minutes.saturating_mul(60));
    }

    pub fn add_seconds(&mut self, seconds: i64) {
        let total = self.second_of_day().saturating_add(seconds);
        let days = total.div_euclid(SECONDS_PER_DAY);
        let rest = total.rem_euclid(SECONDS_PER_DAY);

        self.hour = (rest / 3600) as u8;
        self.minute = (rest % 3600 / 60) as u8;
        self.second = (rest % 60) as u8;

        if days != 0 {
            self.add_days(days);
        }
    }

    /// Compares only the fields at or above `granularity`.
    pub fn compare(&self, other: &Instant, granularity: Granularity) -> Ordering {
        self.truncate(granularity).cmp(&other.truncate(granularity))
    }

    /// Weekday from 0 (Monday) to 6 (Sunday).
    pub fn weekday(&self) -> u8 {
        date_from_day_number(self.day_number())
            .map_or(0, |date| date.weekday().num_days_from_monday() as u8)
    }

    /// Distance in days, 0 to 6, from the most recent `week_start` day.
    pub fn weekday_offset(&self, week_start: u8) -> u8 {
        (self.weekday() + 7 - week_start) % 7
    }

    /// Day of the year, from 1 to 366.
    pub fn day_of_year(&self) -> u16 {
        let first = Instant::from_ymd(self.year, 0, 1);
        (self.day_number() - first.day_number() + 1) as u16
    }

    /// Days since the start of the common era. Out of range days carry into
    /// the following month.
    pub fn day_number(&self) -> i64 {
        let first = NaiveDate::from_ymd_opt(self.year.into(), u32::from(self.month) + 1, 1)
            .map_or(0, |date| i64::from(date.num_days_from_ce()));
        first + i64::from(self.day) - 1
    }

    pub fn second_of_day(&self) -> i64 {
        i64::from(self.hour) * 3600 + i64::from(self.minute) * 60 + i64::from(self.second)
    }

    /// Calendar distance to `later` as whole days plus seconds, ignoring any
    /// change in UTC offset between the two.
    pub fn span_to(&self, later: &Instant) -> (i64, i64) {
        let mut days = later.day_number() - self.day_number();
        let mut seconds = later.second_of_day() - self.second_of_day();
        if seconds < 0 {
            days -= 1;
            seconds += SECONDS_PER_DAY;
        }
        (days, seconds)
    }

    pub(crate) fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Instant {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    fn set_day_number(&mut self, day_number: i64) {
        match date_from_day_number(day_number) {
            Some(date) => {
                self.year = clamp_year(date.year().into());
                self.month = date.month0() as u8;
                self.day = date.day() as u8;
            }
            None if day_number > 0 => {
                self.year = u16::MAX;
                self.month = 11;
                self.day = 31;
            }
            None => {
                self.year = 0;
                self.month = 0;
                self.day = 1;
            }
        }
    }

    fn truncate(&self, granularity: Granularity) -> Instant {
        let mut truncated = *self;
        if granularity < Granularity::Second {
            truncated.second = 0;
        }
        if granularity < Granularity::Minute {
            truncated.minute = 0;
        }
        if granularity < Granularity::Hour {
            truncated.hour = 0;
        }
        if granularity < Granularity::Day {
            truncated.day = 0;
        }
        if granularity < Granularity::Month {
            truncated.month = 0;
        }
        truncated
    }
}

pub fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the zero based `month`.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 if is_leap_year(year) => 29,
        0..=11 => DAYS_IN_MONTH[usize::from(month)],
        _ => 0,
    }
}

pub fn days_in_year(year: u16) -> u16 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

fn date_from_day_number(day_number: i64) -> Option<NaiveDate> {
    i32::try_from(day_number)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

fn clamp_year(year: i64) -> u16 {
    u16::try_from(year.max(0)).unwrap_or(u16::MAX)
}
