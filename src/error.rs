/// Errors reported while building rules or starting an expansion.
///
/// Everything else that can go wrong during an expansion (an inapplicable
/// modifier, an instant past the representable range) only produces fewer
/// occurrences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("component has no start time")]
    MissingStart,

    #[error("unknown time zone '{0}'")]
    UnknownZone(String),

    #[error("unknown frequency '{0}'")]
    UnknownFrequency(String),

    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),

    #[error("interval must be at least 1")]
    InvalidInterval,

    #[error("count must be at least 1")]
    InvalidCount,

    #[error("{part} value {value} is out of range")]
    OutOfRange { part: &'static str, value: i32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
