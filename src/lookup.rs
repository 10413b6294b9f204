use crate::instant::Instant;
use crate::rrule::RRule;

/// Membership tables for the filter functions, built once per rule
/// expansion.
///
/// Negative values live in their own tables indexed by the distance from the
/// end of the period, so `neg_month_days[1]` is the last day of any month.
#[derive(Debug, Clone)]
pub(crate) struct LookupTables {
    pub months: [bool; 12],
    pub year_days: [bool; 367],
    pub neg_year_days: [bool; 367],
    pub month_days: [bool; 32],
    pub neg_month_days: [bool; 32],
    pub weekdays: [bool; 7],
    pub hours: [bool; 24],
    pub minutes: [bool; 60],
    pub seconds: [bool; 62],
}

impl LookupTables {
    fn new(rule: &RRule) -> Self {
        let mut tables = LookupTables {
            months: [false; 12],
            year_days: [false; 367],
            neg_year_days: [false; 367],
            month_days: [false; 32],
            neg_month_days: [false; 32],
            weekdays: [false; 7],
            hours: [false; 24],
            minutes: [false; 60],
            seconds: [false; 62],
        };

        mark(&mut tables.months, rule.by_month.iter().map(|&m| usize::from(m)));
        for &day in &rule.by_year_day {
            let index = usize::from(day.unsigned_abs());
            if day > 0 {
                tables.year_days[index] = true;
            } else {
                tables.neg_year_days[index] = true;
            }
        }
        for &day in &rule.by_month_day {
            let index = usize::from(day.unsigned_abs());
            if day > 0 {
                tables.month_days[index] = true;
            } else {
                tables.neg_month_days[index] = true;
            }
        }
        // ordinals play no part when filtering
        mark(&mut tables.weekdays, rule.by_day.iter().map(|&(d, _)| usize::from(d)));
        mark(&mut tables.hours, rule.by_hour.iter().map(|&h| usize::from(h)));
        mark(&mut tables.minutes, rule.by_minute.iter().map(|&m| usize::from(m)));
        mark(&mut tables.seconds, rule.by_second.iter().map(|&s| usize::from(s)));

        tables
    }
}

fn mark(table: &mut [bool], values: impl Iterator<Item = usize>) {
    for value in values {
        if let Some(slot) = table.get_mut(value) {
            *slot = true;
        }
    }
}

/// Everything the modifier functions need to know about the rule being
/// expanded. Each expansion builds its own, nothing is shared.
#[derive(Debug, Clone)]
pub(crate) struct RuleContext<'a> {
    pub rule: &'a RRule,
    pub tables: LookupTables,
    /// weekday of the event start, counted from the rule's week start
    pub weekday: u8,
}

impl<'a> RuleContext<'a> {
    pub fn new(rule: &'a RRule, event_start: &Instant) -> Self {
        RuleContext {
            rule,
            tables: LookupTables::new(rule),
            weekday: event_start.weekday_offset(rule.week_start_day()),
        }
    }

    pub fn interval(&self) -> i64 {
        i64::from(self.rule.interval())
    }

    pub fn week_start(&self) -> u8 {
        self.rule.week_start_day()
    }
}
