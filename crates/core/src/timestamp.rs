//! Microsecond-precision timestamp used by [`crate::Commit`] and version
//! metadata.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Microsecond-precision timestamp, stored as microseconds since the Unix
/// epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC).
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Current wall-clock time. Returns [`Self::EPOCH`] if the system clock
    /// is set before the epoch.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Timestamp(micros)
    }

    /// Construct from microseconds since the epoch.
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Microseconds since the epoch.
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Render as an RFC-3339 string, e.g. for `datetime` attribute values.
    pub fn to_rfc3339(&self) -> String {
        self.to_chrono().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse an RFC-3339 string as produced by the query language's
    /// `datetime` literal parsing.
    pub fn parse_rfc3339(input: &str) -> Result<Self, chrono::ParseError> {
        let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(input)?.with_timezone(&Utc);
        let micros = parsed.timestamp_micros().max(0) as u64;
        Ok(Timestamp(micros))
    }

    fn to_chrono(self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.0 as i64).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_epoch() {
        assert!(Timestamp::now() > Timestamp::EPOCH);
    }

    #[test]
    fn rfc3339_round_trips() {
        let ts = Timestamp::from_micros(1_700_000_000_000_000);
        let rendered = ts.to_rfc3339();
        let parsed = Timestamp::parse_rfc3339(&rendered).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn ordering_matches_micros() {
        assert!(Timestamp::from_micros(1) < Timestamp::from_micros(2));
    }
}
