use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::ModifierFn;
use crate::period;
use crate::rrule::Frequency;
use crate::{
    daily::Daily, hourly::Hourly, minutely::Minutely, monthly::Monthly, secondly::Secondly,
    weekly::Weekly, yearly::Yearly,
};
use std::cmp::Ordering;

/// Why a rule stopped producing periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stop {
    /// Past the end of the requested interval; later intervals may have more.
    IntervalEnd,
    /// Past the rule's own end (or the last representable year).
    RuleEnd,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    pub event_start: Instant,
    pub rule_end: Option<Instant>,
    pub interval_start: Instant,
    pub interval_end: Option<Instant>,
    pub max_year: u16,
}

impl Bounds {
    /// Fails once `time` is after the rule end or the interval end, looking
    /// only at fields down to `granularity`.
    pub fn check(&self, time: &Instant, granularity: Granularity) -> Result<(), Stop> {
        if time.year > self.max_year {
            return Err(Stop::RuleEnd);
        }
        if let Some(end) = &self.rule_end {
            if time.compare(end, granularity) == Ordering::Greater {
                return Err(Stop::RuleEnd);
            }
        }
        if let Some(end) = &self.interval_end {
            if time.compare(end, granularity) == Ordering::Greater {
                return Err(Stop::IntervalEnd);
            }
        }
        Ok(())
    }

    /// Fails when the rule ends before the interval starts, or starts after
    /// the interval ends.
    pub fn check_overlap(&self, granularity: Granularity) -> Result<(), Stop> {
        if let Some(end) = &self.rule_end {
            if end.compare(&self.interval_start, granularity) == Ordering::Less {
                return Err(Stop::RuleEnd);
            }
        }
        if let Some(end) = &self.interval_end {
            if self.event_start.compare(end, granularity) == Ordering::Greater {
                return Err(Stop::IntervalEnd);
            }
        }
        Ok(())
    }
}

/// How each modifier acts at one frequency. `None` marks a modifier that
/// has no meaning at that frequency and is skipped.
pub(crate) struct ModifierTable {
    pub by_month: ModifierFn,
    pub by_week_no: Option<ModifierFn>,
    pub by_year_day: Option<ModifierFn>,
    pub by_month_day: Option<ModifierFn>,
    pub by_day: ModifierFn,
    pub by_hour: ModifierFn,
    pub by_minute: ModifierFn,
    pub by_second: ModifierFn,
}

/// One frequency: how its periods are found and how a period's set of
/// occurrences is built.
pub(crate) trait Strategy {
    fn modifiers(&self) -> &'static ModifierTable;

    /// The first period reachable from the event start in whole intervals
    /// that intersects the interval in `bounds`.
    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop>;

    /// Advances `cursor` by one interval.
    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop>;

    fn assemble(&self, context: &RuleContext<'_>, cursor: Instant) -> Vec<Instant> {
        period::assemble_default(self.modifiers(), context, cursor)
    }
}

pub(crate) fn strategy(freq: Frequency) -> &'static dyn Strategy {
    match freq {
        Frequency::Yearly => &Yearly,
        Frequency::Monthly => &Monthly,
        Frequency::Weekly => &Weekly,
        Frequency::Daily => &Daily,
        Frequency::Hourly => &Hourly,
        Frequency::Minutely => &Minutely,
        Frequency::Secondly => &Secondly,
    }
}

/// Rounds a non-negative number of units up to a multiple of `interval`.
pub(crate) fn round_up(units: i64, interval: i64) -> i64 {
    let units = units + interval - 1;
    units - units % interval
}

/// Number of `unit_seconds` units from `from` to `to`, counted on the
/// day number so long spans do not drift.
pub(crate) fn units_between(from: &Instant, to: &Instant, unit_seconds: i64) -> i64 {
    let days = to.day_number() - from.day_number();
    let seconds = to.second_of_day() / unit_seconds - from.second_of_day() / unit_seconds;
    days * (24 * 60 * 60 / unit_seconds) + seconds
}
