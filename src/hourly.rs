use crate::frequency::{round_up, units_between, Bounds, ModifierTable, Stop, Strategy};
use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::*;

pub(crate) struct Hourly;

static MODIFIERS: ModifierTable = ModifierTable {
    by_month: by_month_filter,
    by_week_no: None,
    by_year_day: Some(by_year_day_filter),
    by_month_day: Some(by_month_day_filter),
    by_day: by_day_filter,
    by_hour: by_hour_filter,
    by_minute: by_minute_expand,
    by_second: by_second_expand,
};

impl Strategy for Hourly {
    fn modifiers(&self) -> &'static ModifierTable {
        &MODIFIERS
    }

    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop> {
        bounds.check_overlap(Granularity::Hour)?;

        let mut cursor = bounds.event_start;
        let hours = units_between(&cursor, &bounds.interval_start, 60 * 60);
        if hours > 0 {
            cursor.add_hours(round_up(hours, context.interval()));
        }

        bounds.check(&cursor, Granularity::Hour)?;
        Ok(cursor)
    }

    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop> {
        cursor.add_hours(context.interval());
        bounds.check(cursor, Granularity::Hour)
    }
}
