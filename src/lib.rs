//! Expansion of iCalendar recurrence data (RRULE, RDATE, EXRULE, EXDATE)
//! into concrete occurrences.
//!
//! Rules are expanded in the wall-clock time of the event's zone; only the
//! final occurrences are converted to UTC. Times skipped or repeated by a
//! daylight saving transition are not special-cased.

mod component;
pub mod count;
mod daily;
mod error;
mod frequency;
mod hourly;
pub mod instant;
mod lookup;
mod minutely;
mod modifiers;
mod monthly;
mod period;
pub mod rrule;
mod secondly;
pub mod set;
mod weekly;
mod yearly;
mod zone;

#[cfg(test)]
mod test_helpers;

pub use component::{Component, DateOrTime, DateValue, RDate, Span, ZoneRef};
pub use count::{ensure_end_dates, resolve_count_end, resolve_exrule_count_end, CountEnd};
pub use error::{Error, Result};
pub use instant::{Granularity, Instant};
pub use rrule::{ByDay, End, Frequency, RRule, Until};
pub use set::{generate_instances, Occurrence, Occurrences};
pub use zone::{local_zone, IanaResolver, ZoneResolver};

/// Default last year that expansion may reach, so unbounded rules end.
pub const MAX_YEAR: u16 = 9999;
