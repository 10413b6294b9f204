use crate::frequency::{round_up, units_between, Bounds, ModifierTable, Stop, Strategy};
use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::*;

pub(crate) struct Secondly;

static MODIFIERS: ModifierTable = ModifierTable {
    by_month: by_month_filter,
    by_week_no: None,
    by_year_day: Some(by_year_day_filter),
    by_month_day: Some(by_month_day_filter),
    by_day: by_day_filter,
    by_hour: by_hour_filter,
    by_minute: by_minute_filter,
    by_second: by_second_filter,
};

impl Strategy for Secondly {
    fn modifiers(&self) -> &'static ModifierTable {
        &MODIFIERS
    }

    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop> {
        bounds.check_overlap(Granularity::Second)?;

        let mut cursor = bounds.event_start;
        let seconds = units_between(&cursor, &bounds.interval_start, 1);
        if seconds > 0 {
            cursor.add_seconds(round_up(seconds, context.interval()));
        }

        bounds.check(&cursor, Granularity::Second)?;
        Ok(cursor)
    }

    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop> {
        cursor.add_seconds(context.interval());
        bounds.check(cursor, Granularity::Second)
    }
}
