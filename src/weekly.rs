use crate::frequency::{round_up, Bounds, ModifierTable, Stop, Strategy};
use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::*;
use crate::period;

pub(crate) struct Weekly;

static MODIFIERS: ModifierTable = ModifierTable {
    by_month: by_month_filter,
    by_week_no: None,
    by_year_day: None,
    by_month_day: None,
    by_day: by_day_expand_weekly,
    by_hour: by_hour_expand,
    by_minute: by_minute_expand,
    by_second: by_second_expand,
};

impl Strategy for Weekly {
    fn modifiers(&self) -> &'static ModifierTable {
        &MODIFIERS
    }

    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop> {
        bounds.check_overlap(Granularity::Day)?;

        let mut cursor = bounds.event_start;
        let event_week = cursor.day_number() - i64::from(context.weekday);
        let start = &bounds.interval_start;
        let interval_week =
            start.day_number() - i64::from(start.weekday_offset(context.week_start()));
        if interval_week > event_week {
            let weeks = (interval_week - event_week) / 7;
            cursor.add_days(round_up(weeks, context.interval()) * 7);
        }

        check_week(&cursor, context, bounds)?;
        Ok(cursor)
    }

    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop> {
        cursor.add_days(context.interval() * 7);
        check_week(cursor, context, bounds)
    }

    /// BYMONTH filters the days of the week rather than the week itself, so
    /// a week across two months keeps the days in the listed month. Filtering
    /// the cursor first would drop every week that starts in another month.
    fn assemble(&self, context: &RuleContext<'_>, cursor: Instant) -> Vec<Instant> {
        let occs = by_day_expand_weekly(context, vec![cursor]);
        let occs = by_month_filter(context, occs);
        period::time_of_day(&MODIFIERS, context, occs)
    }
}

/// The week is over the bounds only once its first day is.
fn check_week(cursor: &Instant, context: &RuleContext<'_>, bounds: &Bounds) -> Result<(), Stop> {
    let mut week_start = *cursor;
    week_start.add_days(-i64::from(context.weekday));
    bounds.check(&week_start, Granularity::Day)
}
