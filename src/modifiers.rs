//! The BYxxx modifiers.
//!
//! A modifier finer than the rule's frequency expands each candidate into
//! several, one coarser than or equal to it filters the candidates. Every
//! function returns its input unchanged when the rule does not use the
//! modifier. Expansion may produce invalid days (31 April); those are
//! dropped once the period's set is complete.

use crate::instant::{days_in_month, days_in_year, Instant};
use crate::lookup::RuleContext;

pub(crate) type ModifierFn = fn(&RuleContext<'_>, Vec<Instant>) -> Vec<Instant>;

pub(crate) fn by_month_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    let months = &context.rule.by_month;
    if months.is_empty() {
        return occs;
    }

    occs.iter()
        .flat_map(|occ| months.iter().map(move |&month| Instant { month, ..*occ }))
        .collect()
}

pub(crate) fn by_month_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    if context.rule.by_month.is_empty() {
        return occs;
    }

    occs.into_iter()
        .filter(|occ| context.tables.months[usize::from(occ.month)])
        .collect()
}

pub(crate) fn by_week_no_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    let weeks = &context.rule.by_week_no;
    if weeks.is_empty() {
        return occs;
    }

    let mut expanded = Vec::with_capacity(occs.len() * weeks.len());
    for occ in &occs {
        let this_year = first_week(context, occ, occ.year);
        // negative weeks count back from week 1 of the next year
        let next_year = first_week(context, occ, occ.year.saturating_add(1));

        for &week in weeks {
            let mut time = if week > 0 { this_year } else { next_year };
            let weeks_to_add = if week > 0 { week - 1 } else { week };
            time.add_days(i64::from(weeks_to_add) * 7);
            expanded.push(time);
        }
    }
    expanded
}

pub(crate) fn by_year_day_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    let days = &context.rule.by_year_day;
    if days.is_empty() {
        return occs;
    }

    let mut expanded = Vec::with_capacity(occs.len() * days.len());
    for occ in &occs {
        let year_start = Instant {
            month: 0,
            day: 1,
            ..*occ
        };
        let next_year_start = Instant {
            year: occ.year.saturating_add(1),
            ..year_start
        };

        for &day in days {
            let mut time = if day > 0 {
                year_start
            } else {
                next_year_start
            };
            time.add_days(if day > 0 { i64::from(day) - 1 } else { day.into() });

            if time.year == occ.year {
                expanded.push(time);
            }
        }
    }
    expanded
}

/// Candidates must be valid dates.
pub(crate) fn by_year_day_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    if context.rule.by_year_day.is_empty() {
        return occs;
    }

    let tables = &context.tables;
    occs.into_iter()
        .filter(|occ| {
            let day = occ.day_of_year();
            let from_end = (days_in_year(occ.year) + 1).saturating_sub(day);
            is_set(&tables.year_days, day.into()) || is_set(&tables.neg_year_days, from_end.into())
        })
        .collect()
}

pub(crate) fn by_month_day_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    let days = &context.rule.by_month_day;
    if days.is_empty() {
        return occs;
    }

    let mut expanded = Vec::with_capacity(occs.len() * days.len());
    for occ in &occs {
        let month_start = Instant { day: 1, ..*occ };
        let mut next_month_start = month_start;
        next_month_start.add_months(1);

        for &day in days {
            let mut time = if day > 0 {
                month_start
            } else {
                next_month_start
            };
            time.add_days(if day > 0 { i64::from(day) - 1 } else { day.into() });

            if time.year == occ.year && time.month == occ.month {
                expanded.push(time);
            }
        }
    }
    expanded
}

pub(crate) fn by_month_day_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    if context.rule.by_month_day.is_empty() {
        return occs;
    }

    let tables = &context.tables;
    occs.into_iter()
        .filter(|occ| {
            let from_end = (days_in_month(occ.year, occ.month) + 1).saturating_sub(occ.day);
            is_set(&tables.month_days, occ.day.into())
                || is_set(&tables.neg_month_days, from_end.into())
        })
        .collect()
}

pub(crate) fn by_day_expand_yearly(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    if context.rule.by_day.is_empty() {
        return occs;
    }

    let mut expanded = Vec::new();
    for occ in &occs {
        let first = Instant {
            month: 0,
            day: 1,
            ..*occ
        };
        let last = Instant {
            month: 11,
            day: 31,
            ..*occ
        };
        nth_weekdays(context, first, last, &mut expanded);
    }
    expanded
}

pub(crate) fn by_day_expand_monthly(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    if context.rule.by_day.is_empty() {
        return occs;
    }

    let mut expanded = Vec::new();
    for occ in &occs {
        let first = Instant { day: 1, ..*occ };
        let last = Instant {
            day: days_in_month(occ.year, occ.month),
            ..*occ
        };
        nth_weekdays(context, first, last, &mut expanded);
    }
    expanded
}

/// Moves each candidate to every listed weekday of its week. Ordinals are
/// ignored. Candidates must be valid dates.
pub(crate) fn by_day_expand_weekly(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    let days = &context.rule.by_day;
    if days.is_empty() {
        return occs;
    }

    let week_start = context.week_start();
    let mut expanded = Vec::with_capacity(occs.len() * days.len());
    for occ in &occs {
        let current = i64::from(occ.weekday_offset(week_start));
        for &(weekday, _) in days {
            let target = i64::from((weekday + 7 - week_start) % 7);
            let mut time = *occ;
            time.add_days(target - current);
            expanded.push(time);
        }
    }
    expanded
}

/// Candidates must be valid dates.
pub(crate) fn by_day_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    if context.rule.by_day.is_empty() {
        return occs;
    }

    occs.into_iter()
        .filter(|occ| context.tables.weekdays[usize::from(occ.weekday())])
        .collect()
}

pub(crate) fn by_hour_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    expand_field(&context.rule.by_hour, occs, |time, hour| time.hour = hour)
}

pub(crate) fn by_hour_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    filter_field(&context.rule.by_hour, &context.tables.hours, occs, |time| time.hour)
}

pub(crate) fn by_minute_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    expand_field(&context.rule.by_minute, occs, |time, minute| time.minute = minute)
}

pub(crate) fn by_minute_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    filter_field(&context.rule.by_minute, &context.tables.minutes, occs, |time| time.minute)
}

pub(crate) fn by_second_expand(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    expand_field(&context.rule.by_second, occs, |time, second| time.second = second)
}

pub(crate) fn by_second_filter(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    filter_field(&context.rule.by_second, &context.tables.seconds, occs, |time| time.second)
}

/// Appends the BYDAY matches between `first` and `last`, inclusive, which
/// must be the first and last day of one month or year.
fn nth_weekdays(context: &RuleContext<'_>, first: Instant, last: Instant, out: &mut Vec<Instant>) {
    let in_period = |time: &Instant| *time >= first && *time <= last;

    for &(weekday, ordinal) in &context.rule.by_day {
        if ordinal >= 0 {
            let mut time = first;
            time.add_days(i64::from((weekday + 7 - first.weekday()) % 7));

            if ordinal == 0 {
                while in_period(&time) {
                    out.push(time);
                    time.add_days(7);
                }
                continue;
            }

            time.add_days((i64::from(ordinal) - 1) * 7);
            if in_period(&time) {
                out.push(time);
            }
        } else {
            let mut time = last;
            time.add_days(-i64::from((last.weekday() + 7 - weekday) % 7));
            time.add_days((i64::from(ordinal) + 1) * 7);
            if in_period(&time) {
                out.push(time);
            }
        }
    }
}

/// The day in week 1 of `year` that falls on the event's weekday. Week 1 is
/// the first week with at least four days in the year, so it may start in
/// December of the previous year.
fn first_week(context: &RuleContext<'_>, occ: &Instant, year: u16) -> Instant {
    let mut time = Instant {
        year,
        month: 0,
        day: 1,
        ..*occ
    };

    let week_start = context.week_start();
    let mut offset = i64::from((week_start + 7 - time.weekday()) % 7);
    if offset >= 4 {
        offset -= 7;
    }
    offset += i64::from(context.weekday);

    time.add_days(offset);
    time
}

fn expand_field(values: &[u8], occs: Vec<Instant>, set: impl Fn(&mut Instant, u8)) -> Vec<Instant> {
    if values.is_empty() {
        return occs;
    }

    let mut expanded = Vec::with_capacity(occs.len() * values.len());
    for occ in &occs {
        for &value in values {
            let mut time = *occ;
            set(&mut time, value);
            expanded.push(time);
        }
    }
    expanded
}

fn filter_field(
    values: &[u8],
    table: &[bool],
    occs: Vec<Instant>,
    field: impl Fn(&Instant) -> u8,
) -> Vec<Instant> {
    if values.is_empty() {
        return occs;
    }

    occs.into_iter()
        .filter(|occ| is_set(table, field(occ).into()))
        .collect()
}

fn is_set(table: &[bool], index: usize) -> bool {
    table.get(index).copied().unwrap_or(false)
}
