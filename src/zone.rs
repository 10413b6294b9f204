use crate::component::{DateOrTime, DateValue, ZoneRef};
use crate::error::{Error, Result};
use crate::instant::Instant;
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset as _, TimeZone as _, Utc};
use chrono_tz::Tz;

/// Turns a TZID parameter into a zone.
pub trait ZoneResolver {
    fn resolve(&self, tzid: &str) -> Option<Tz>;
}

/// Resolves TZIDs against the IANA database names.
#[derive(Debug, Clone, Copy, Default)]
pub struct IanaResolver;

impl ZoneResolver for IanaResolver {
    fn resolve(&self, tzid: &str) -> Option<Tz> {
        tzid.parse().ok()
    }
}

/// The host's zone, or UTC when it cannot be determined.
pub fn local_zone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            tracing::warn!(%name, "unknown local time zone, using UTC");
            Tz::UTC
        }),
        Err(err) => {
            tracing::warn!(%err, "could not detect local time zone, using UTC");
            Tz::UTC
        }
    }
}

/// Conversions between component values, the event's wall clock and UTC.
pub(crate) struct Zones<'a> {
    event: Tz,
    floating: Tz,
    resolver: &'a dyn ZoneResolver,
}

impl<'a> Zones<'a> {
    /// Fails when the event start names a zone the resolver does not know.
    pub fn new(start: &ZoneRef, floating: Tz, resolver: &'a dyn ZoneResolver) -> Result<Self> {
        let mut zones = Zones {
            event: floating,
            floating,
            resolver,
        };
        zones.event = zones
            .lookup(start)
            .ok_or_else(|| Error::UnknownZone(tzid(start)))?;
        Ok(zones)
    }

    pub fn event(&self) -> Tz {
        self.event
    }

    /// Reads `value` as wall-clock time in the event's zone. Values in another
    /// zone are converted; floating values and dates are taken as they are.
    pub fn to_local(&self, value: &DateValue) -> Instant {
        let time = match value.value {
            DateOrTime::Date(date) => return Instant::from_date(date),
            DateOrTime::DateTime(time) => time,
        };

        if value.zone == ZoneRef::Floating {
            return Instant::from_naive(time);
        }

        match self.lookup(&value.zone) {
            Some(zone) if zone == self.event => Instant::from_naive(time),
            Some(zone) => match to_utc(zone, &time) {
                Some(utc) => self.from_utc(&utc),
                None => Instant::from_naive(time),
            },
            None => {
                tracing::warn!(tzid = %tzid(&value.zone), "unknown zone, reading as event time");
                Instant::from_naive(time)
            }
        }
    }

    /// `None` when the instant is not a real date or is out of range.
    pub fn to_utc(&self, instant: &Instant) -> Option<DateTime<Utc>> {
        to_utc(self.event, &instant.to_naive()?)
    }

    pub fn from_utc(&self, time: &DateTime<Utc>) -> Instant {
        Instant::from_naive(time.with_timezone(&self.event).naive_local())
    }

    fn lookup(&self, zone: &ZoneRef) -> Option<Tz> {
        match zone {
            ZoneRef::Floating => Some(self.floating),
            ZoneRef::Utc => Some(Tz::UTC),
            ZoneRef::Tzid(id) => self.resolver.resolve(id),
        }
    }
}

/// Ambiguous wall-clock times take the earlier instant. Times skipped by a
/// forward transition are shifted by the offset in force before it.
fn to_utc(zone: Tz, time: &NaiveDateTime) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(time) {
        LocalResult::Single(local) => Some(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // a day earlier is clear of the transition
            let before = time.checked_sub_signed(Duration::days(1))?;
            let offset = zone
                .offset_from_local_datetime(&before)
                .earliest()?
                .fix()
                .local_minus_utc();
            let utc = time.checked_sub_signed(Duration::seconds(offset.into()))?;
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}

fn tzid(zone: &ZoneRef) -> String {
    match zone {
        ZoneRef::Floating => "floating".to_string(),
        ZoneRef::Utc => "UTC".to_string(),
        ZoneRef::Tzid(id) => id.clone(),
    }
}
