//! Builds the occurrences of one rule, period by period.

use crate::frequency::{self, Bounds, ModifierTable, Stop};
use crate::instant::Instant;
use crate::lookup::RuleContext;
use crate::modifiers::*;
use crate::rrule::RRule;

/// Output of expanding one rule over one interval.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expansion {
    /// Sorted within each period, periods in order.
    pub occurrences: Vec<Instant>,
    /// The rule has nothing left after this interval.
    pub finished: bool,
}

/// Expands `rule` for the event and interval in `bounds`.
///
/// Occurrences before the event start are still returned, since they count
/// towards BYSETPOS; anything after the rule end is not.
pub(crate) fn expand(rule: &RRule, bounds: &Bounds) -> Expansion {
    let context = RuleContext::new(rule, &bounds.event_start);
    let strategy = frequency::strategy(rule.freq());

    let mut cursor = match strategy.find_start(&context, bounds) {
        Ok(cursor) => cursor,
        Err(stop) => {
            tracing::trace!(freq = %rule.freq(), ?stop, "no period in interval");
            return Expansion {
                occurrences: Vec::new(),
                finished: stop == Stop::RuleEnd,
            };
        }
    };

    let mut occurrences = Vec::new();
    loop {
        let mut set = strategy.assemble(&context, cursor);
        sort_and_clean(&mut set);
        let mut set = by_set_pos_filter(rule, set);
        if let Some(end) = &bounds.rule_end {
            set.retain(|occ| occ <= end);
        }
        occurrences.append(&mut set);

        if let Err(stop) = strategy.find_next(&mut cursor, &context, bounds) {
            tracing::trace!(
                freq = %rule.freq(),
                ?stop,
                count = occurrences.len(),
                "rule expanded"
            );
            return Expansion {
                occurrences,
                finished: stop == Stop::RuleEnd,
            };
        }
    }
}

/// Sorts, removes duplicates and drops dates that do not exist.
pub(crate) fn sort_and_clean(occs: &mut Vec<Instant>) {
    occs.sort_unstable();
    occs.dedup();
    occs.retain(Instant::is_valid);
}

/// Keeps the 1-based positions listed in BYSETPOS, negatives counting from
/// the end. The input must already be sorted and clean.
pub(crate) fn by_set_pos_filter(rule: &RRule, occs: Vec<Instant>) -> Vec<Instant> {
    let positions = &rule.by_set_pos;
    if positions.is_empty() {
        return occs;
    }

    let len = occs.len() as i64;
    occs.into_iter()
        .enumerate()
        .filter(|&(index, _)| {
            let index = index as i64;
            positions.iter().any(|&pos| {
                let pos = i64::from(pos);
                if pos > 0 {
                    pos - 1 == index
                } else {
                    len + pos == index
                }
            })
        })
        .map(|(_, occ)| occ)
        .collect()
}

/// Runs the frequency's modifiers in order over a single period.
pub(crate) fn assemble_default(
    table: &ModifierTable,
    context: &RuleContext<'_>,
    cursor: Instant,
) -> Vec<Instant> {
    let mut occs = (table.by_month)(context, vec![cursor]);
    for modifier in [table.by_week_no, table.by_year_day, table.by_month_day]
        .iter()
        .flatten()
    {
        occs = modifier(context, occs);
    }
    occs = (table.by_day)(context, occs);
    time_of_day(table, context, occs)
}

/// BYMONTHDAY and BYDAY each expand the month on their own and the results
/// are joined; with only one of them it is applied alone.
pub(crate) fn assemble_monthly(
    table: &ModifierTable,
    context: &RuleContext<'_>,
    cursor: Instant,
) -> Vec<Instant> {
    let occs = (table.by_month)(context, vec![cursor]);
    let occs = month_days_and_weekdays(context, occs);
    time_of_day(table, context, occs)
}

/// Each day-level modifier expands the year independently and the results
/// are joined before the time of day is applied.
pub(crate) fn assemble_yearly(
    table: &ModifierTable,
    context: &RuleContext<'_>,
    cursor: Instant,
) -> Vec<Instant> {
    let rule = context.rule;
    let mut occs = Vec::new();

    if !rule.by_month.is_empty() {
        let months = by_month_expand(context, vec![cursor]);
        occs.extend(month_days_and_weekdays(context, months));
    }

    if !rule.by_week_no.is_empty() {
        let weeks = by_week_no_expand(context, vec![cursor]);
        occs.extend(by_day_expand_weekly(context, weeks));
    }

    if !rule.by_year_day.is_empty() {
        occs.extend(by_year_day_expand(context, vec![cursor]));
    }

    // without BYMONTH the month days apply to every month
    if !rule.by_month_day.is_empty() && rule.by_month.is_empty() {
        let months = (0..12).map(|month| Instant { month, ..cursor }).collect();
        occs.extend(by_month_day_expand(context, months));
    }

    if !rule.by_day.is_empty() && rule.by_month.is_empty() && rule.by_week_no.is_empty() {
        occs.extend(by_day_expand_yearly(context, vec![cursor]));
    }

    let has_days = !(rule.by_month.is_empty()
        && rule.by_week_no.is_empty()
        && rule.by_year_day.is_empty()
        && rule.by_month_day.is_empty()
        && rule.by_day.is_empty());
    if !has_days {
        occs.push(cursor);
    }

    time_of_day(table, context, occs)
}

fn month_days_and_weekdays(context: &RuleContext<'_>, occs: Vec<Instant>) -> Vec<Instant> {
    let rule = context.rule;
    if !rule.by_month_day.is_empty() && !rule.by_day.is_empty() {
        let mut days = by_month_day_expand(context, occs.clone());
        days.extend(by_day_expand_monthly(context, occs));
        days
    } else {
        by_day_expand_monthly(context, by_month_day_expand(context, occs))
    }
}

pub(crate) fn time_of_day(
    table: &ModifierTable,
    context: &RuleContext<'_>,
    occs: Vec<Instant>,
) -> Vec<Instant> {
    let occs = (table.by_hour)(context, occs);
    let occs = (table.by_minute)(context, occs);
    (table.by_second)(context, occs)
}
