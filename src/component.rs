use crate::rrule::RRule;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Where a date-time value is anchored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRef {
    /// Wall-clock time with no zone, read in the floating zone.
    Floating,
    Utc,
    Tzid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// A DTSTART, DTEND, RDATE or EXDATE value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateValue {
    pub value: DateOrTime,
    pub zone: ZoneRef,
}

impl DateValue {
    /// A date-only value. Date-only values are always floating.
    pub fn date(date: NaiveDate) -> Self {
        DateValue {
            value: DateOrTime::Date(date),
            zone: ZoneRef::Floating,
        }
    }

    pub fn floating(time: NaiveDateTime) -> Self {
        DateValue {
            value: DateOrTime::DateTime(time),
            zone: ZoneRef::Floating,
        }
    }

    pub fn utc(time: NaiveDateTime) -> Self {
        DateValue {
            value: DateOrTime::DateTime(time),
            zone: ZoneRef::Utc,
        }
    }

    pub fn zoned(time: NaiveDateTime, tzid: impl Into<String>) -> Self {
        DateValue {
            value: DateOrTime::DateTime(time),
            zone: ZoneRef::Tzid(tzid.into()),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self.value, DateOrTime::Date(_))
    }
}

/// How long an event or an RDATE period lasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    End(DateValue),
    Duration(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RDate {
    pub at: DateValue,
    /// Set for RDATE periods. Overrides the event duration for this date only.
    pub span: Option<Span>,
}

impl From<DateValue> for RDate {
    fn from(at: DateValue) -> Self {
        RDate { at, span: None }
    }
}

/// A calendar component carrying recurrence data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    pub start: Option<DateValue>,
    /// DTEND or DURATION.
    pub end: Option<Span>,
    pub rrules: Vec<RRule>,
    pub rdates: Vec<RDate>,
    pub exrules: Vec<RRule>,
    pub exdates: Vec<DateValue>,
}

impl Component {
    pub fn new(start: DateValue) -> Self {
        Component {
            start: Some(start),
            ..Component::default()
        }
    }

    pub fn end(mut self, end: Span) -> Self {
        self.end = Some(end);
        self
    }

    pub fn rrule(mut self, rule: RRule) -> Self {
        self.rrules.push(rule);
        self
    }

    pub fn rdate(mut self, rdate: impl Into<RDate>) -> Self {
        self.rdates.push(rdate.into());
        self
    }

    pub fn exrule(mut self, rule: RRule) -> Self {
        self.exrules.push(rule);
        self
    }

    pub fn exdate(mut self, exdate: DateValue) -> Self {
        self.exdates.push(exdate);
        self
    }

    pub fn is_recurring(&self) -> bool {
        !self.rrules.is_empty() || !self.rdates.is_empty()
    }
}
