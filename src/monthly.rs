use crate::frequency::{round_up, Bounds, ModifierTable, Stop, Strategy};
use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::*;
use crate::period;

pub(crate) struct Monthly;

static MODIFIERS: ModifierTable = ModifierTable {
    by_month: by_month_filter,
    by_week_no: None,
    by_year_day: None,
    by_month_day: Some(by_month_day_expand),
    by_day: by_day_expand_monthly,
    by_hour: by_hour_expand,
    by_minute: by_minute_expand,
    by_second: by_second_expand,
};

impl Strategy for Monthly {
    fn modifiers(&self) -> &'static ModifierTable {
        &MODIFIERS
    }

    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop> {
        bounds.check_overlap(Granularity::Month)?;

        let mut cursor = bounds.event_start;
        let start = &bounds.interval_start;
        let months = (i64::from(start.year) - i64::from(cursor.year)) * 12
            + i64::from(start.month)
            - i64::from(cursor.month);
        if months > 0 {
            cursor.add_months(round_up(months, context.interval()));
        }

        bounds.check(&cursor, Granularity::Month)?;
        Ok(cursor)
    }

    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop> {
        cursor.add_months(context.interval());
        bounds.check(cursor, Granularity::Month)
    }

    fn assemble(&self, context: &RuleContext<'_>, cursor: Instant) -> Vec<Instant> {
        period::assemble_monthly(&MODIFIERS, context, cursor)
    }
}
