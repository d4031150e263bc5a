//! Wall-clock access and the fixed civil zone every timestamp is presented in.
//!
//! Timestamps are stored as Unix seconds and only rendered as
//! `YYYY-MM-DD HH:MM:SS` (UTC+8) at the edges of the system.

use std::sync::{Arc, Mutex};

use time::format_description::FormatItem;
use time::macros::{format_description, offset};
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// China Standard Time, UTC+8.
pub const CST: UtcOffset = offset!(+8);

/// The civil `YYYY-MM-DD HH:MM:SS` form shared by `format` and `parse`.
const CIVIL: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, thiserror::Error)]
pub enum TimeFormatError {
    #[error("malformed timestamp {input:?}: {source}")]
    Malformed {
        input: String,
        #[source]
        source: time::error::Parse,
    },
    #[error("stored timestamp {0} is out of range")]
    OutOfRange(i64),
}

pub trait Clock: Send + Sync {
    /// Current time at the CST offset, truncated to whole seconds.
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        truncate(OffsetDateTime::now_utc())
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(truncate(start))),
        }
    }

    pub fn set(&self, at: OffsetDateTime) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = truncate(at);
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = truncate(*current + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn truncate(at: OffsetDateTime) -> OffsetDateTime {
    at.replace_nanosecond(0)
        .unwrap_or(at)
        .to_offset(CST)
}

pub fn format(at: OffsetDateTime) -> String {
    let at = at.to_offset(CST);
    // an OffsetDateTime carries every component CIVIL names
    at.format(CIVIL).unwrap_or_else(|_| at.to_string())
}

pub fn parse(input: &str) -> Result<OffsetDateTime, TimeFormatError> {
    PrimitiveDateTime::parse(input, CIVIL)
        .map(|at| at.assume_offset(CST))
        .map_err(|source| TimeFormatError::Malformed {
            input: input.to_string(),
            source,
        })
}

/// Unix seconds, the persisted representation.
pub fn to_epoch(at: OffsetDateTime) -> i64 {
    at.unix_timestamp()
}

/// Reads back a persisted timestamp. Values outside the representable range
/// are an error rather than being replaced.
pub fn from_epoch(seconds: i64) -> Result<OffsetDateTime, TimeFormatError> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .map(|at| at.to_offset(CST))
        .map_err(|_| TimeFormatError::OutOfRange(seconds))
}

/// Serde adapter rendering timestamps in the civil CST format.
pub mod cst {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S>(at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(*at))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).map_err(de::Error::custom)
    }
}
