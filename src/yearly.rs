use crate::frequency::{round_up, Bounds, ModifierTable, Stop, Strategy};
use crate::instant::{Granularity, Instant};
use crate::lookup::RuleContext;
use crate::modifiers::*;
use crate::period;

pub(crate) struct Yearly;

static MODIFIERS: ModifierTable = ModifierTable {
    by_month: by_month_expand,
    by_week_no: Some(by_week_no_expand),
    by_year_day: Some(by_year_day_expand),
    by_month_day: Some(by_month_day_expand),
    by_day: by_day_expand_yearly,
    by_hour: by_hour_expand,
    by_minute: by_minute_expand,
    by_second: by_second_expand,
};

impl Strategy for Yearly {
    fn modifiers(&self) -> &'static ModifierTable {
        &MODIFIERS
    }

    fn find_start(&self, context: &RuleContext<'_>, bounds: &Bounds) -> Result<Instant, Stop> {
        bounds.check_overlap(Granularity::Year)?;

        let mut cursor = bounds.event_start;
        let years = i64::from(bounds.interval_start.year) - i64::from(cursor.year);
        if years > 0 {
            cursor.add_months(round_up(years, context.interval()) * 12);
        }

        bounds.check(&cursor, Granularity::Year)?;
        Ok(cursor)
    }

    fn find_next(
        &self,
        cursor: &mut Instant,
        context: &RuleContext<'_>,
        bounds: &Bounds,
    ) -> Result<(), Stop> {
        cursor.add_months(context.interval() * 12);
        bounds.check(cursor, Granularity::Year)
    }

    fn assemble(&self, context: &RuleContext<'_>, cursor: Instant) -> Vec<Instant> {
        period::assemble_yearly(&MODIFIERS, context, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrule::{Frequency, Options, RRule};
    use crate::test_helpers::*;

    #[test]
    fn starts_on_an_interval_year() {
        let rule = RRule::new(
            Frequency::Yearly,
            Options {
                interval: Some(4),
                ..Options::default()
            },
        )
        .unwrap();
        let start = at(2012, 2, 29, 9, 0, 0);
        let context = RuleContext::new(&rule, &start);
        let bounds = bounds(start, at(2021, 6, 1, 0, 0, 0), Some(at(2030, 1, 1, 0, 0, 0)));

        let mut cursor = Yearly.find_start(&context, &bounds).unwrap();
        assert_eq!(at(2024, 2, 29, 9, 0, 0), cursor);

        Yearly.find_next(&mut cursor, &context, &bounds).unwrap();
        assert_eq!(at(2028, 2, 29, 9, 0, 0), cursor);

        assert_eq!(
            Err(Stop::IntervalEnd),
            Yearly.find_next(&mut cursor, &context, &bounds)
        );
    }

    #[test]
    fn nothing_before_the_event() {
        let rule = RRule::new(Frequency::Yearly, Options::default()).unwrap();
        let start = at(2024, 1, 1, 0, 0, 0);
        let context = RuleContext::new(&rule, &start);
        let bounds = bounds(start, at(2020, 1, 1, 0, 0, 0), Some(at(2020, 12, 31, 0, 0, 0)));

        assert_eq!(
            Err(Stop::IntervalEnd),
            Yearly.find_start(&context, &bounds)
        );
    }
}
