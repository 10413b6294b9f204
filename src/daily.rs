use crate::frequency::{round_up, Bounds, ModifierTable, Stop, Strategy};
use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::*;

pub(crate) struct Daily;

static MODIFIERS: ModifierTable = ModifierTable {
    by_month: by_month_filter,
    by_week_no: None,
    by_year_day: Some(by_year_day_filter),
    by_month_day: Some(by_month_day_filter),
    by_day: by_day_filter,
    by_hour: by_hour_expand,
    by_minute: by_minute_expand,
    by_second: by_second_expand,
};

impl Strategy for Daily {
    fn modifiers(&self) -> &'static ModifierTable {
        &MODIFIERS
    }

    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop> {
        bounds.check_overlap(Granularity::Day)?;

        let mut cursor = bounds.event_start;
        let days = bounds.interval_start.day_number() - cursor.day_number();
        if days > 0 {
            cursor.add_days(round_up(days, context.interval()));
        }

        bounds.check(&cursor, Granularity::Day)?;
        Ok(cursor)
    }

    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop> {
        cursor.add_days(context.interval());
        bounds.check(cursor, Granularity::Day)
    }
}
