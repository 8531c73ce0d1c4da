//! UTC timestamp with millisecond precision, as used by audit events,
//! tasks, and the heartbeat log.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, always UTC, serialized as ISO-8601 with millisecond
/// precision (e.g. `2026-07-28T12:34:56.789Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap an existing UTC instant.
    #[must_use]
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn epoch_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Render as ISO-8601 with millisecond precision.
    #[must_use]
    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The underlying `chrono` instant.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_millisecond_precision_rfc3339() {
        let ts = Timestamp::now();
        let rendered = ts.to_rfc3339();
        assert!(rendered.ends_with('Z'));
        assert!(rendered.contains('.'));
    }

    #[test]
    fn ordering_matches_epoch_millis() {
        let a = Timestamp::now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = Timestamp::now();
        assert!(a <= b);
        assert!(a.epoch_millis() <= b.epoch_millis());
    }
}
