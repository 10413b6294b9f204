//! COUNT-limited rules.
//!
//! A COUNT has to be turned into an end instant before a rule can be
//! expanded over an arbitrary interval, which means expanding the rule from
//! the start. The result can be stored on the rule so that only the first
//! expansion pays for it.

use crate::component::Component;
use crate::error::Result;
use crate::rrule::{End, RRule};
use crate::set::{Occurrences, Options};
use chrono::{DateTime, Utc};

/// The resolved end of a COUNT rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountEnd {
    /// Start of the last counted occurrence.
    Reached(DateTime<Utc>),
    /// The rule never produces that many occurrences.
    Unreached,
}

/// Resolves the end of `rule` as if it were the only rule of `component`.
///
/// The event start counts as the first occurrence. RDATEs and exclusions
/// play no part. Rules without a COUNT are never reached.
pub fn resolve_count_end(
    component: &Component,
    rule: &RRule,
    options: &Options<'_>,
) -> Result<CountEnd> {
    resolve(component, rule, true, options)
}

/// Resolves the end of an exception rule. Unlike an RRULE, the event start
/// is only counted when the rule itself produces it.
pub fn resolve_exrule_count_end(
    component: &Component,
    rule: &RRule,
    options: &Options<'_>,
) -> Result<CountEnd> {
    resolve(component, rule, false, options)
}

fn resolve(
    component: &Component,
    rule: &RRule,
    include_start: bool,
    options: &Options<'_>,
) -> Result<CountEnd> {
    let count = match rule.end() {
        End::Count(count) => count,
        _ => return Ok(CountEnd::Unreached),
    };

    let single = Component {
        start: component.start.clone(),
        end: component.end.clone(),
        rrules: vec![rule.unbounded()],
        ..Component::default()
    };
    let mut all = Occurrences::build(&single, None, None, options, include_start)?;

    let end = match all.nth(count as usize - 1) {
        Some(occurrence) => CountEnd::Reached(occurrence.start),
        None => CountEnd::Unreached,
    };
    tracing::debug!(freq = %rule.freq(), count, ?end, "resolved COUNT");
    Ok(end)
}

/// Stores the resolved end on every COUNT rule and exception rule of
/// `component`. Rules that already carry one are left alone unless
/// `refresh` is set. Returns whether any rule changed.
pub fn ensure_end_dates(
    component: &mut Component,
    refresh: bool,
    options: &Options<'_>,
) -> Result<bool> {
    let mut changed = false;

    for index in 0..component.rrules.len() {
        let rule = &component.rrules[index];
        if let Some(end) = needs_end(rule, component, true, refresh, options)? {
            changed |= component.rrules[index].count_end() != Some(end);
            component.rrules[index].set_count_end(Some(end));
        }
    }
    for index in 0..component.exrules.len() {
        let rule = &component.exrules[index];
        if let Some(end) = needs_end(rule, component, false, refresh, options)? {
            changed |= component.exrules[index].count_end() != Some(end);
            component.exrules[index].set_count_end(Some(end));
        }
    }

    Ok(changed)
}

fn needs_end(
    rule: &RRule,
    component: &Component,
    inclusive: bool,
    refresh: bool,
    options: &Options<'_>,
) -> Result<Option<CountEnd>> {
    match rule.end() {
        End::Count(_) if refresh || rule.count_end().is_none() => {
            resolve(component, rule, inclusive, options).map(Some)
        }
        _ => Ok(None),
    }
}
