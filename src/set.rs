use crate::component::{Component, Span};
use crate::count::{self, CountEnd};
use crate::error::{Error, Result};
use crate::frequency::Bounds;
use crate::instant::{Granularity, Instant};
use crate::period;
use crate::rrule::{End, RRule, Until};
use crate::zone::{local_zone, IanaResolver, ZoneResolver, Zones};
use crate::MAX_YEAR;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::cmp::Ordering;
use std::collections::VecDeque;

#[derive(Clone, Copy, Default)]
pub struct Options<'a> {
    /// Last year that may be generated. Defaults to [`MAX_YEAR`].
    pub max_year: Option<u16>,
    /// Zone for floating times. Defaults to the host's zone.
    pub floating_zone: Option<Tz>,
    /// Defaults to [`IanaResolver`].
    pub resolver: Option<&'a dyn ZoneResolver>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

struct BoundRule<'a> {
    rule: &'a RRule,
    end: Option<Instant>,
}

/// An RDATE and, for RDATE periods, its own end.
#[derive(Debug, Clone, Copy)]
struct ExplicitDate {
    at: Instant,
    end: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Inclusion {
    at: Instant,
    explicit_span: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Exclusion {
    at: Instant,
    date_only: bool,
}

impl Exclusion {
    /// Date-only exclusions remove everything on their day.
    fn compare(&self, time: &Instant) -> Ordering {
        let granularity = if self.date_only {
            Granularity::Day
        } else {
            Granularity::Second
        };
        self.at.compare(time, granularity)
    }
}

/// The occurrences of a component, one calendar year at a time.
///
/// Occurrences come out in order within each year. Stop pulling to stop the
/// expansion; nothing past the current year has been computed.
pub struct Occurrences<'a> {
    zones: Zones<'a>,
    event_start: Instant,
    include_start: bool,
    /// whole days and seconds
    duration: (i64, i64),
    rules: Vec<BoundRule<'a>>,
    exrules: Vec<BoundRule<'a>>,
    rdates: Vec<ExplicitDate>,
    exdates: Vec<Exclusion>,
    query_start: Option<DateTime<Utc>>,
    query_end: Option<DateTime<Utc>>,
    interval_start: Instant,
    interval_end: Option<Instant>,
    max_year: u16,
    year: u16,
    last_year: u16,
    buffer: VecDeque<Occurrence>,
    done: bool,
}

impl<'a> Occurrences<'a> {
    /// Occurrences overlapping `[start, end)`; `None` leaves that side open.
    /// An occurrence that started before `start` but is still going on is
    /// included.
    pub fn new(
        component: &'a Component,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        options: &Options<'a>,
    ) -> Result<Self> {
        Self::build(component, start, end, options, true)
    }

    /// Like [`Occurrences::new`], with the event start only counted when a
    /// rule or RDATE produces it.
    pub(crate) fn build(
        component: &'a Component,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        options: &Options<'a>,
        include_start: bool,
    ) -> Result<Self> {
        let dtstart = component.start.as_ref().ok_or(Error::MissingStart)?;
        let floating = options.floating_zone.unwrap_or_else(local_zone);
        let resolver = options.resolver.unwrap_or(&IanaResolver);
        let zones = Zones::new(&dtstart.zone, floating, resolver)?;

        let event_start = zones.to_local(dtstart);
        let duration = match &component.end {
            Some(span) => span_of(&zones, &event_start, span),
            None if dtstart.is_date() => (1, 0),
            None => (0, 0),
        };

        let rules = bind_rules(component, &component.rrules, true, &zones, options)?;
        let exrules = bind_rules(component, &component.exrules, false, &zones, options)?;

        let mut rdates: Vec<_> = component
            .rdates
            .iter()
            .map(|rdate| {
                let at = zones.to_local(&rdate.at);
                let end = rdate.span.as_ref().map(|span| match span {
                    Span::End(value) => zones.to_local(value),
                    Span::Duration(_) => shifted(at, span_of(&zones, &at, span)),
                });
                ExplicitDate { at, end }
            })
            .collect();
        rdates.sort_by_key(|date| date.at);

        let mut exdates: Vec<_> = component
            .exdates
            .iter()
            .map(|value| Exclusion {
                at: zones.to_local(value),
                date_only: value.is_date(),
            })
            .collect();
        exdates.sort_by_key(|date| date.at);

        let interval_start = match start {
            Some(time) => {
                // occurrences starting this much earlier still overlap
                let mut earliest = zones.from_utc(&time);
                earliest.add_days(-duration.0);
                earliest.add_seconds(-duration.1);
                earliest.max(event_start)
            }
            None => event_start,
        };
        let interval_end = end.map(|time| zones.from_utc(&time));
        let max_year = options.max_year.unwrap_or(MAX_YEAR);
        let last_year = interval_end.map_or(max_year, |end| end.year.min(max_year));

        tracing::debug!(
            zone = %zones.event(),
            rules = rules.len(),
            exrules = exrules.len(),
            rdates = rdates.len(),
            exdates = exdates.len(),
            "expanding component"
        );

        Ok(Occurrences {
            zones,
            event_start,
            include_start,
            duration,
            rules,
            exrules,
            rdates,
            exdates,
            query_start: start,
            query_end: end,
            interval_start,
            interval_end,
            max_year,
            year: interval_start.year,
            last_year,
            buffer: VecDeque::new(),
            done: false,
        })
    }

    fn next_chunk(&mut self) {
        if self.year > self.last_year {
            self.done = true;
            return;
        }

        let (occurrences, more) = self.chunk(self.year);
        self.buffer.extend(occurrences);

        if more && self.year < self.last_year {
            self.year += 1;
        } else {
            self.done = true;
        }
    }

    /// Occurrences starting in `year`, and whether any later year may have
    /// more.
    fn chunk(&self, year: u16) -> (Vec<Occurrence>, bool) {
        let chunk_start = if year == self.interval_start.year {
            self.interval_start
        } else {
            Instant::from_ymd(year, 0, 1)
        };
        let chunk_end = match self.interval_end {
            Some(end) if end.year == year => end,
            _ => Instant::from_ymd(year, 11, 31).end_of_day(),
        };
        let bounds = |rule: &BoundRule<'_>| Bounds {
            event_start: self.event_start,
            rule_end: rule.end,
            interval_start: chunk_start,
            interval_end: Some(chunk_end),
            max_year: self.max_year,
        };

        let mut more = false;
        let mut inclusions = Vec::new();
        if self.include_start {
            inclusions.push(Inclusion {
                at: self.event_start,
                explicit_span: false,
            });
        }
        for rule in &self.rules {
            let expansion = period::expand(rule.rule, &bounds(rule));
            more |= !expansion.finished;
            inclusions.extend(expansion.occurrences.into_iter().map(|at| Inclusion {
                at,
                explicit_span: false,
            }));
        }
        for rdate in &self.rdates {
            if rdate.at > chunk_end {
                more = true;
            } else if rdate.at >= chunk_start {
                inclusions.push(Inclusion {
                    at: rdate.at,
                    explicit_span: rdate.end.is_some(),
                });
            }
        }

        let mut exclusions: Vec<_> = self
            .exdates
            .iter()
            .filter(|ex| {
                ex.at.compare(&chunk_start, Granularity::Day) != Ordering::Less
                    && ex.at.compare(&chunk_end, Granularity::Day) != Ordering::Greater
            })
            .copied()
            .collect();
        for rule in &self.exrules {
            let expansion = period::expand(rule.rule, &bounds(rule));
            exclusions.extend(expansion.occurrences.into_iter().map(|at| Exclusion {
                at,
                date_only: false,
            }));
        }

        inclusions.sort_by_key(|inclusion| inclusion.at);
        exclusions.sort_by_key(|exclusion| exclusion.at);

        let mut occurrences = Vec::new();
        for inclusion in remove_exceptions(inclusions, &exclusions) {
            let at = inclusion.at;
            if at < self.event_start || at < chunk_start || at > chunk_end {
                continue;
            }

            let end = if inclusion.explicit_span {
                self.explicit_end(&at)
            } else {
                None
            }
            .unwrap_or_else(|| shifted(at, self.duration));

            let (start, end) = match (self.zones.to_utc(&at), self.zones.to_utc(&end)) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    tracing::warn!(?at, "occurrence out of range, stopping");
                    more = false;
                    break;
                }
            };
            if self.query_start.map_or(false, |query| start < query && end <= query) {
                continue;
            }
            if self.query_end.map_or(false, |query| start >= query) {
                continue;
            }

            occurrences.push(Occurrence { start, end });
        }

        // wall-clock times skipped by a forward transition land on or after
        // the first real time following it
        occurrences.sort();
        occurrences.dedup_by_key(|occurrence| occurrence.start);

        tracing::debug!(year, count = occurrences.len(), more, "expanded year");
        (occurrences, more)
    }

    fn explicit_end(&self, at: &Instant) -> Option<Instant> {
        let first = self.rdates.partition_point(|date| date.at < *at);
        self.rdates[first..]
            .iter()
            .take_while(|date| date.at == *at)
            .find_map(|date| date.end)
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        loop {
            if let Some(occurrence) = self.buffer.pop_front() {
                return Some(occurrence);
            }
            if self.done {
                return None;
            }
            self.next_chunk();
        }
    }
}

/// Calls `callback` with each occurrence overlapping `[start, end)` until it
/// returns `false`.
pub fn generate_instances<F>(
    component: &Component,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    options: &Options<'_>,
    mut callback: F,
) -> Result<()>
where
    F: FnMut(&Component, DateTime<Utc>, DateTime<Utc>) -> bool,
{
    for occurrence in Occurrences::new(component, start, end, options)? {
        if !callback(component, occurrence.start, occurrence.end) {
            break;
        }
    }
    Ok(())
}

impl Component {
    /// Every occurrence, using the default [`Options`].
    pub fn all(&self) -> Result<Occurrences<'_>> {
        Occurrences::new(self, None, None, &Options::default())
    }

    /// Occurrences still going on at or after `min`.
    pub fn after(&self, min: DateTime<Utc>) -> Result<Occurrences<'_>> {
        Occurrences::new(self, Some(min), None, &Options::default())
    }

    /// Occurrences overlapping `[start, end)`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Occurrences<'_>> {
        Occurrences::new(self, Some(start), Some(end), &Options::default())
    }
}

fn bind_rules<'a>(
    component: &Component,
    rules: &'a [RRule],
    inclusive: bool,
    zones: &Zones<'_>,
    options: &Options<'_>,
) -> Result<Vec<BoundRule<'a>>> {
    rules
        .iter()
        .map(|rule| {
            Ok(BoundRule {
                rule,
                end: rule_end(component, rule, inclusive, zones, options)?,
            })
        })
        .collect()
}

/// The last instant the rule may produce, in the event's zone. Only
/// inclusive rules count the event start towards a COUNT.
fn rule_end(
    component: &Component,
    rule: &RRule,
    inclusive: bool,
    zones: &Zones<'_>,
    options: &Options<'_>,
) -> Result<Option<Instant>> {
    let count_end = match rule.end() {
        End::Never => return Ok(None),
        End::Until(Until::Date(date)) => return Ok(Some(Instant::from_date(date).end_of_day())),
        End::Until(Until::DateTime(time)) => return Ok(Some(zones.from_utc(&time))),
        End::Count(_) => match rule.count_end() {
            Some(end) => end,
            None if inclusive => count::resolve_count_end(component, rule, options)?,
            None => count::resolve_exrule_count_end(component, rule, options)?,
        },
    };

    Ok(match count_end {
        CountEnd::Reached(time) => Some(zones.from_utc(&time)),
        CountEnd::Unreached => None,
    })
}

/// Drops every inclusion matched by an exclusion and collapses duplicates,
/// keeping an explicit span from any of them. Both inputs must be sorted.
fn remove_exceptions(inclusions: Vec<Inclusion>, exclusions: &[Exclusion]) -> Vec<Inclusion> {
    let mut kept: Vec<Inclusion> = Vec::with_capacity(inclusions.len());
    let mut previous: Option<(Instant, bool)> = None;
    let mut next_exclusion = 0;

    for inclusion in inclusions {
        if let Some((at, excluded)) = previous {
            if at == inclusion.at {
                if !excluded {
                    if let Some(last) = kept.last_mut() {
                        last.explicit_span |= inclusion.explicit_span;
                    }
                }
                continue;
            }
        }

        while exclusions
            .get(next_exclusion)
            .map_or(false, |ex| ex.compare(&inclusion.at) == Ordering::Less)
        {
            next_exclusion += 1;
        }
        let excluded = exclusions[next_exclusion..]
            .iter()
            .take_while(|ex| ex.at.compare(&inclusion.at, Granularity::Day) != Ordering::Greater)
            .any(|ex| ex.compare(&inclusion.at) == Ordering::Equal);

        previous = Some((inclusion.at, excluded));
        if !excluded {
            kept.push(inclusion);
        }
    }
    kept
}

fn span_of(zones: &Zones<'_>, start: &Instant, span: &Span) -> (i64, i64) {
    let (days, seconds) = match span {
        Span::End(value) => start.span_to(&zones.to_local(value)),
        Span::Duration(duration) => {
            let days = duration.num_days();
            let seconds = (*duration - Duration::days(days)).num_seconds();
            (days, seconds)
        }
    };

    if days < 0 || seconds < 0 {
        (0, 0)
    } else {
        (days, seconds)
    }
}

fn shifted(mut time: Instant, (days, seconds): (i64, i64)) -> Instant {
    time.add_days(days);
    time.add_seconds(seconds);
    time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{DateValue, RDate};
    use crate::rrule::{ByDay, Frequency, Options as RuleOptions};
    use crate::test_helpers::*;
    use chrono::{Timelike as _, Weekday};

    fn rule(freq: Frequency, options: RuleOptions) -> RRule {
        RRule::new(freq, options).unwrap()
    }

    #[test]
    fn missing_start() {
        let component = Component::default();
        assert_eq!(
            Some(Error::MissingStart),
            Occurrences::new(&component, None, None, &options()).err()
        );
    }

    #[test]
    fn unknown_zone() {
        let start = DateValue::zoned(naive(2024, 1, 1, 9, 0, 0), "Nowhere/Land");
        let component = Component::new(start);
        assert!(matches!(
            Occurrences::new(&component, None, None, &options()),
            Err(Error::UnknownZone(_))
        ));
    }

    #[test]
    fn single_event() {
        let component = Component::new(DateValue::utc(naive(2024, 5, 1, 9, 0, 0)))
            .end(Span::Duration(Duration::hours(2)));

        let all: Vec<_> = Occurrences::new(&component, None, None, &options())
            .unwrap()
            .collect();
        assert_eq!(
            vec![Occurrence {
                start: utc(2024, 5, 1, 9, 0, 0),
                end: utc(2024, 5, 1, 11, 0, 0),
            }],
            all
        );

        // still going on at 10:00
        assert_eq!(
            vec![utc(2024, 5, 1, 9, 0, 0)],
            starts(&component, Some(utc(2024, 5, 1, 10, 0, 0)), None)
        );
        // over at 11:00
        assert!(starts(&component, Some(utc(2024, 5, 1, 11, 0, 0)), None).is_empty());
        // the query end is exclusive
        assert!(starts(&component, None, Some(utc(2024, 5, 1, 9, 0, 0))).is_empty());
    }

    #[test]
    fn date_only_events_last_a_day() {
        let component = Component::new(DateValue::date(date(2024, 3, 1)));

        let all: Vec<_> = Occurrences::new(&component, None, None, &options())
            .unwrap()
            .collect();
        assert_eq!(utc(2024, 3, 1, 0, 0, 0), all[0].start);
        assert_eq!(utc(2024, 3, 2, 0, 0, 0), all[0].end);
    }

    #[test]
    fn deterministic() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 9, 0, 0))).rrule(rule(
            Frequency::Weekly,
            RuleOptions {
                by_day: vec![ByDay::every(Weekday::Tue), ByDay::every(Weekday::Sat)],
                end: End::Count(20),
                ..RuleOptions::default()
            },
        ));

        let first = starts(&component, None, None);
        let second = starts(&component, None, None);
        assert_eq!(20, first.len());
        assert_eq!(first, second);
    }

    #[test]
    fn no_duplicates() {
        let start = naive(2024, 1, 1, 9, 0, 0);
        let component = Component::new(DateValue::utc(start))
            .rrule(rule(
                Frequency::Daily,
                RuleOptions {
                    end: End::Count(3),
                    ..RuleOptions::default()
                },
            ))
            .rrule(rule(
                Frequency::Daily,
                RuleOptions {
                    interval: Some(2),
                    end: End::Count(2),
                    ..RuleOptions::default()
                },
            ))
            .rdate(DateValue::utc(start))
            .rdate(DateValue::utc(naive(2024, 1, 2, 9, 0, 0)));

        assert_eq!(
            vec![
                utc(2024, 1, 1, 9, 0, 0),
                utc(2024, 1, 2, 9, 0, 0),
                utc(2024, 1, 3, 9, 0, 0),
            ],
            starts(&component, None, None)
        );
    }

    #[test]
    fn never_emits_invalid_dates() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 31, 9, 0, 0))).rrule(rule(
            Frequency::Monthly,
            RuleOptions {
                by_month_day: vec![31],
                ..RuleOptions::default()
            },
        ));

        let months: Vec<_> = starts(&component, None, Some(utc(2025, 1, 1, 0, 0, 0)))
            .iter()
            .map(|start| start.format("%m-%d").to_string())
            .collect();
        assert_eq!(
            vec!["01-31", "03-31", "05-31", "07-31", "08-31", "10-31", "12-31"],
            months
        );
    }

    #[test]
    fn last_day_of_month() {
        let component = Component::new(DateValue::utc(naive(2024, 2, 1, 0, 0, 0))).rrule(rule(
            Frequency::Monthly,
            RuleOptions {
                by_month_day: vec![-1],
                end: End::Count(4),
                ..RuleOptions::default()
            },
        ));

        // the start counts as the first occurrence
        assert_eq!(
            vec![
                utc(2024, 2, 1, 0, 0, 0),
                utc(2024, 2, 29, 0, 0, 0),
                utc(2024, 3, 31, 0, 0, 0),
                utc(2024, 4, 30, 0, 0, 0),
            ],
            starts(&component, None, None)
        );
    }

    #[test]
    fn last_workday_of_each_month() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 31, 17, 0, 0))).rrule(rule(
            Frequency::Monthly,
            RuleOptions {
                by_day: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
                    .iter()
                    .map(|&d| ByDay::every(d))
                    .collect(),
                by_set_pos: vec![-1],
                end: End::Count(6),
                ..RuleOptions::default()
            },
        ));

        let days: Vec<_> = starts(&component, None, None)
            .iter()
            .map(|start| start.format("%m-%d").to_string())
            .collect();
        assert_eq!(vec!["01-31", "02-29", "03-29", "04-30", "05-31", "06-28"], days);
    }

    #[test]
    fn date_only_exdate_removes_the_whole_day() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 0, 0, 0)))
            .rrule(rule(
                Frequency::Hourly,
                RuleOptions {
                    end: End::Until(Until::Date(date(2024, 1, 3))),
                    ..RuleOptions::default()
                },
            ))
            .exdate(DateValue::date(date(2024, 1, 2)));

        let all = starts(&component, None, None);
        assert_eq!(48, all.len());
        assert!(all.iter().all(|start| start.format("%d").to_string() != "02"));
        assert_eq!(Some(&utc(2024, 1, 3, 23, 0, 0)), all.last());
    }

    #[test]
    fn exdate_with_time_removes_one() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 0, 0, 0)))
            .rrule(rule(
                Frequency::Hourly,
                RuleOptions {
                    interval: Some(6),
                    end: End::Count(4),
                    ..RuleOptions::default()
                },
            ))
            .exdate(DateValue::utc(naive(2024, 1, 1, 12, 0, 0)))
            .exdate(DateValue::utc(naive(2024, 1, 1, 13, 0, 0)));

        assert_eq!(
            vec![0, 6, 18],
            starts(&component, None, None)
                .iter()
                .map(|start| start.hour())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn exdate_can_remove_the_start() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 9, 0, 0)))
            .rrule(rule(
                Frequency::Daily,
                RuleOptions {
                    end: End::Count(3),
                    ..RuleOptions::default()
                },
            ))
            .exdate(DateValue::utc(naive(2024, 1, 1, 9, 0, 0)));

        assert_eq!(
            vec![utc(2024, 1, 2, 9, 0, 0), utc(2024, 1, 3, 9, 0, 0)],
            starts(&component, None, None)
        );
    }

    #[test]
    fn exrule() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 9, 0, 0)))
            .rrule(rule(
                Frequency::Daily,
                RuleOptions {
                    end: End::Count(14),
                    ..RuleOptions::default()
                },
            ))
            .exrule(rule(
                Frequency::Weekly,
                RuleOptions {
                    by_day: vec![ByDay::every(Weekday::Sat), ByDay::every(Weekday::Sun)],
                    ..RuleOptions::default()
                },
            ));

        assert_eq!(10, starts(&component, None, None).len());
    }

    #[test]
    fn monthly_count_skips_missing_days() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 31, 10, 0, 0))).rrule(rule(
            Frequency::Monthly,
            RuleOptions {
                end: End::Count(4),
                ..RuleOptions::default()
            },
        ));

        assert_eq!(
            vec![
                utc(2024, 1, 31, 10, 0, 0),
                utc(2024, 3, 31, 10, 0, 0),
                utc(2024, 5, 31, 10, 0, 0),
                utc(2024, 7, 31, 10, 0, 0),
            ],
            starts(&component, None, None)
        );
    }

    #[test]
    fn weekly_from_a_wednesday() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 3, 9, 0, 0))).rrule(rule(
            Frequency::Weekly,
            RuleOptions {
                week_start: Some(Weekday::Mon),
                by_day: vec![
                    ByDay::every(Weekday::Mon),
                    ByDay::every(Weekday::Wed),
                    ByDay::every(Weekday::Fri),
                ],
                ..RuleOptions::default()
            },
        ));

        let days: Vec<_> = starts(&component, None, Some(utc(2024, 1, 20, 0, 0, 0)))
            .iter()
            .map(|start| start.format("%d").to_string())
            .collect();
        assert_eq!(vec!["03", "05", "08", "10", "12", "15", "17", "19"], days);
    }

    #[test]
    fn weeks_across_new_year_are_not_repeated() {
        // a Monday
        let component = Component::new(DateValue::utc(naive(2024, 12, 30, 9, 0, 0))).rrule(rule(
            Frequency::Weekly,
            RuleOptions {
                by_day: vec![ByDay::every(Weekday::Mon), ByDay::every(Weekday::Thu)],
                end: End::Count(4),
                ..RuleOptions::default()
            },
        ));

        assert_eq!(
            vec![
                utc(2024, 12, 30, 9, 0, 0),
                utc(2025, 1, 2, 9, 0, 0),
                utc(2025, 1, 6, 9, 0, 0),
                utc(2025, 1, 9, 9, 0, 0),
            ],
            starts(&component, None, None)
        );
    }

    #[test]
    fn query_in_a_later_year() {
        let component = Component::new(DateValue::utc(naive(2020, 6, 15, 12, 0, 0))).rrule(rule(
            Frequency::Yearly,
            RuleOptions::default(),
        ));

        assert_eq!(
            vec![utc(2031, 6, 15, 12, 0, 0), utc(2032, 6, 15, 12, 0, 0)],
            starts(
                &component,
                Some(utc(2031, 1, 1, 0, 0, 0)),
                Some(utc(2033, 1, 1, 0, 0, 0))
            )
        );
    }

    #[test]
    fn rdate_periods_keep_their_own_span() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 9, 0, 0)))
            .end(Span::Duration(Duration::hours(1)))
            .rdate(RDate {
                at: DateValue::utc(naive(2024, 1, 5, 9, 0, 0)),
                span: Some(Span::Duration(Duration::hours(3))),
            })
            .rdate(RDate {
                at: DateValue::utc(naive(2024, 1, 6, 9, 0, 0)),
                span: Some(Span::End(DateValue::utc(naive(2024, 1, 6, 9, 30, 0)))),
            })
            .rdate(DateValue::utc(naive(2024, 1, 7, 9, 0, 0)));

        let ends: Vec<_> = Occurrences::new(&component, None, None, &options())
            .unwrap()
            .map(|o| o.end - o.start)
            .collect();
        assert_eq!(
            vec![
                Duration::hours(1),
                Duration::hours(3),
                Duration::minutes(30),
                Duration::hours(1),
            ],
            ends
        );
    }

    #[test]
    fn until_date_time_is_utc() {
        let component = Component::new(DateValue::zoned(
            naive(2024, 1, 1, 9, 0, 0),
            "Europe/Berlin",
        ))
        .rrule(rule(
            Frequency::Daily,
            RuleOptions {
                // 09:00 in Berlin on 3 January
                end: End::Until(Until::DateTime(utc(2024, 1, 3, 8, 0, 0))),
                ..RuleOptions::default()
            },
        ));

        assert_eq!(3, starts(&component, None, None).len());
    }

    #[test]
    fn local_time_is_kept_across_daylight_saving() {
        let component = Component::new(DateValue::zoned(
            naive(2024, 3, 9, 9, 0, 0),
            "America/New_York",
        ))
        .rrule(rule(
            Frequency::Daily,
            RuleOptions {
                end: End::Count(2),
                ..RuleOptions::default()
            },
        ));

        assert_eq!(
            vec![utc(2024, 3, 9, 14, 0, 0), utc(2024, 3, 10, 13, 0, 0)],
            starts(&component, None, None)
        );
    }

    #[test]
    fn hourly_across_a_skipped_hour() {
        let component = Component::new(DateValue::zoned(
            naive(2024, 3, 31, 0, 0, 0),
            "Europe/Berlin",
        ))
        .rrule(rule(
            Frequency::Hourly,
            RuleOptions {
                end: End::Count(4),
                ..RuleOptions::default()
            },
        ));

        // 02:00 does not exist and lands on the same instant as 03:00
        assert_eq!(
            vec![
                utc(2024, 3, 30, 23, 0, 0),
                utc(2024, 3, 31, 0, 0, 0),
                utc(2024, 3, 31, 1, 0, 0),
                utc(2024, 3, 31, 2, 0, 0),
            ],
            starts(&component, None, None)
        );
    }

    #[test]
    fn leap_second_on_new_years_eve() {
        let component = Component::new(DateValue::utc(naive(2024, 12, 30, 23, 59, 0))).rrule(
            rule(
                Frequency::Daily,
                RuleOptions {
                    by_hour: vec![23],
                    by_minute: vec![59],
                    by_second: vec![60],
                    ..RuleOptions::default()
                },
            ),
        );

        assert_eq!(
            vec![
                utc(2024, 12, 30, 23, 59, 0),
                utc(2024, 12, 31, 0, 0, 0),
                utc(2025, 1, 1, 0, 0, 0),
            ],
            starts(&component, None, Some(utc(2025, 1, 2, 0, 0, 0)))
        );
    }

    #[test]
    fn max_year_ends_unbounded_rules() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 0, 0, 0))).rrule(rule(
            Frequency::Yearly,
            RuleOptions::default(),
        ));
        let options = Options {
            max_year: Some(2030),
            ..options()
        };

        let all = Occurrences::new(&component, None, None, &options).unwrap();
        assert_eq!(7, all.count());
    }

    #[test]
    fn callback_can_stop() {
        let component = Component::new(DateValue::utc(naive(2024, 1, 1, 0, 0, 0))).rrule(rule(
            Frequency::Minutely,
            RuleOptions::default(),
        ));

        let mut seen = Vec::new();
        let end = Some(utc(2024, 1, 2, 0, 0, 0));
        generate_instances(&component, None, end, &options(), |_, start, _| {
            seen.push(start);
            seen.len() < 3
        })
        .unwrap();

        assert_eq!(
            vec![
                utc(2024, 1, 1, 0, 0, 0),
                utc(2024, 1, 1, 0, 1, 0),
                utc(2024, 1, 1, 0, 2, 0),
            ],
            seen
        );
    }

    #[test]
    fn removing_exceptions() {
        let inclusions = vec![
            Inclusion {
                at: at(2024, 1, 1, 9, 0, 0),
                explicit_span: false,
            },
            Inclusion {
                at: at(2024, 1, 1, 9, 0, 0),
                explicit_span: true,
            },
            Inclusion {
                at: at(2024, 1, 2, 9, 0, 0),
                explicit_span: false,
            },
            Inclusion {
                at: at(2024, 1, 2, 18, 0, 0),
                explicit_span: false,
            },
            Inclusion {
                at: at(2024, 1, 3, 9, 0, 0),
                explicit_span: false,
            },
        ];
        let exclusions = vec![
            Exclusion {
                at: at(2024, 1, 2, 0, 0, 0),
                date_only: true,
            },
            Exclusion {
                at: at(2024, 1, 3, 9, 0, 1),
                date_only: false,
            },
        ];

        assert_eq!(
            vec![
                Inclusion {
                    at: at(2024, 1, 1, 9, 0, 0),
                    explicit_span: true,
                },
                Inclusion {
                    at: at(2024, 1, 3, 9, 0, 0),
                    explicit_span: false,
                },
            ],
            remove_exceptions(inclusions, &exclusions)
        );
    }
}
