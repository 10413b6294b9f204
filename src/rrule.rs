use crate::count::CountEnd;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "YEARLY" => Ok(Frequency::Yearly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "WEEKLY" => Ok(Frequency::Weekly),
            "DAILY" => Ok(Frequency::Daily),
            "HOURLY" => Ok(Frequency::Hourly),
            "MINUTELY" => Ok(Frequency::Minutely),
            "SECONDLY" => Ok(Frequency::Secondly),
            _ => Err(Error::UnknownFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
            Frequency::Hourly => "HOURLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Secondly => "SECONDLY",
        };
        f.write_str(name)
    }
}

/// UNTIL value. A date-time is always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Until {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Never,
    Until(Until),
    Count(u32),
}

impl Default for End {
    fn default() -> Self {
        End::Never
    }
}

/// One BYDAY entry. An ordinal of 0 means every such weekday in the period,
/// otherwise the nth one (negative counts from the end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub weekday: Weekday,
    pub ordinal: i8,
}

impl ByDay {
    pub fn every(weekday: Weekday) -> Self {
        ByDay {
            weekday,
            ordinal: 0,
        }
    }

    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        ByDay { weekday, ordinal }
    }
}

impl FromStr for ByDay {
    type Err = Error;

    /// Parses `MO`, `2TU`, `+3WE` or `-1FR`.
    fn from_str(s: &str) -> Result<Self> {
        let unknown = || Error::UnknownWeekday(s.to_string());
        if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
            return Err(unknown());
        }

        let (ordinal, code) = s.split_at(s.len() - 2);
        let weekday = match code.to_ascii_uppercase().as_str() {
            "MO" => Weekday::Mon,
            "TU" => Weekday::Tue,
            "WE" => Weekday::Wed,
            "TH" => Weekday::Thu,
            "FR" => Weekday::Fri,
            "SA" => Weekday::Sat,
            "SU" => Weekday::Sun,
            _ => return Err(unknown()),
        };
        let ordinal = match ordinal {
            "" => 0,
            n => n.parse().map_err(|_| unknown())?,
        };

        Ok(ByDay { weekday, ordinal })
    }
}

/// Rule parts as they come out of a parser, in RFC numbering (months 1-12).
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub interval: Option<u32>,
    pub end: End,
    pub week_start: Option<Weekday>,
    pub by_month: Vec<u8>,
    pub by_week_no: Vec<i8>,
    pub by_year_day: Vec<i16>,
    pub by_month_day: Vec<i8>,
    pub by_day: Vec<ByDay>,
    pub by_hour: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub by_second: Vec<u8>,
    pub by_set_pos: Vec<i16>,
}

/// A validated recurrence rule. Modifier lists keep their input order and an
/// empty list means the modifier was not given.
#[derive(Debug, Clone, PartialEq)]
pub struct RRule {
    freq: Frequency,
    interval: u32,
    end: End,
    week_start: Weekday,
    /// zero based
    pub(crate) by_month: Vec<u8>,
    pub(crate) by_week_no: Vec<i8>,
    pub(crate) by_year_day: Vec<i16>,
    pub(crate) by_month_day: Vec<i8>,
    /// (weekday from Monday, ordinal)
    pub(crate) by_day: Vec<(u8, i8)>,
    pub(crate) by_hour: Vec<u8>,
    pub(crate) by_minute: Vec<u8>,
    pub(crate) by_second: Vec<u8>,
    pub(crate) by_set_pos: Vec<i16>,
    count_end: Option<CountEnd>,
}

impl RRule {
    pub fn new(freq: Frequency, options: Options) -> Result<Self> {
        let interval = options.interval.unwrap_or(1);
        if interval == 0 {
            return Err(Error::InvalidInterval);
        }
        if let End::Count(0) = options.end {
            return Err(Error::InvalidCount);
        }

        check("BYMONTH", &options.by_month, |v| (1..=12).contains(&v))?;
        check("BYWEEKNO", &options.by_week_no, |v| {
            v != 0 && (-53..=53).contains(&v)
        })?;
        check("BYYEARDAY", &options.by_year_day, |v| {
            v != 0 && (-366..=366).contains(&v)
        })?;
        check("BYMONTHDAY", &options.by_month_day, |v| {
            v != 0 && (-31..=31).contains(&v)
        })?;
        let ordinals: Vec<i8> = options.by_day.iter().map(|d| d.ordinal).collect();
        check("BYDAY", &ordinals, |v| (-53..=53).contains(&v))?;
        check("BYHOUR", &options.by_hour, |v| v < 24)?;
        check("BYMINUTE", &options.by_minute, |v| v < 60)?;
        check("BYSECOND", &options.by_second, |v| v < 62)?;
        check("BYSETPOS", &options.by_set_pos, |v| {
            v != 0 && (-366..=366).contains(&v)
        })?;

        Ok(RRule {
            freq,
            interval,
            end: options.end,
            week_start: options.week_start.unwrap_or(Weekday::Mon),
            by_month: options.by_month.iter().map(|m| m - 1).collect(),
            by_week_no: options.by_week_no,
            by_year_day: options.by_year_day,
            by_month_day: options.by_month_day,
            by_day: options
                .by_day
                .iter()
                .map(|d| (d.weekday.num_days_from_monday() as u8, d.ordinal))
                .collect(),
            by_hour: options.by_hour,
            by_minute: options.by_minute,
            by_second: options.by_second,
            by_set_pos: options.by_set_pos,
            count_end: None,
        })
    }

    pub fn freq(&self) -> Frequency {
        self.freq
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn end(&self) -> End {
        self.end
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// The resolved end of a COUNT rule, if it has been cached on the rule.
    pub fn count_end(&self) -> Option<CountEnd> {
        self.count_end
    }

    /// Stores (or clears) the resolved end of a COUNT rule. Callers must
    /// clear it when they change anything the count depends on.
    pub fn set_count_end(&mut self, count_end: Option<CountEnd>) {
        self.count_end = count_end;
    }

    pub(crate) fn week_start_day(&self) -> u8 {
        self.week_start.num_days_from_monday() as u8
    }

    /// The same rule with no end condition, used to count occurrences.
    pub(crate) fn unbounded(&self) -> RRule {
        RRule {
            end: End::Never,
            count_end: None,
            ..self.clone()
        }
    }
}

fn check<T>(part: &'static str, values: &[T], valid: impl Fn(i32) -> bool) -> Result<()>
where
    T: Copy + Into<i32>,
{
    match values.iter().map(|&v| v.into()).find(|&v| !valid(v)) {
        Some(value) => Err(Error::OutOfRange { part, value }),
        None => Ok(()),
    }
}
