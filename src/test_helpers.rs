use crate::component::Component;
use crate::frequency::Bounds;
use crate::instant::Instant;
use crate::set::{Occurrences, Options};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;

/// An instant with a 1-based month.
pub fn at(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Instant {
    Instant {
        year,
        month: month - 1,
        day,
        hour,
        minute,
        second,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn naive(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

pub fn utc(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive(year, month, day, hour, minute, second))
}

pub fn bounds(
    event_start: Instant,
    interval_start: Instant,
    interval_end: Option<Instant>,
) -> Bounds {
    Bounds {
        event_start,
        rule_end: None,
        interval_start,
        interval_end,
        max_year: crate::MAX_YEAR,
    }
}

/// Floating times are read as UTC so results do not depend on the host.
pub fn options() -> Options<'static> {
    Options {
        floating_zone: Some(Tz::UTC),
        ..Options::default()
    }
}

pub fn starts(
    component: &Component,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<DateTime<Utc>> {
    Occurrences::new(component, start, end, &options())
        .unwrap()
        .map(|occurrence| occurrence.start)
        .collect()
}
