//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp rendered as ISO8601 with a
//! `Z` suffix and seconds precision, and the strict lexical pattern that
//! credential dates must satisfy.
//!
//! ## Invariant
//!
//! Proof `created` values and filled-in `issuanceDate` values are always
//! produced by [`Timestamp::to_iso8601()`], so they match
//! [`VC_DATETIME_PATTERN`] by construction. Non-UTC inputs are rejected
//! by [`Timestamp::parse()`]; there is no silent offset conversion.

use chrono::{DateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The lexical form required of `issuanceDate` and `expirationDate`:
/// `YYYY-MM-DDTHH:MM:SS[.fraction]Z`.
///
/// This is a syntactic check only. Field ranges are bounded (month 01-12,
/// day 01-31, hour 00-23, second up to 60) but calendar validity such as
/// February 30th is not checked.
pub const VC_DATETIME_PATTERN: &str =
    r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])T([01]\d|2[0-3]):[0-5]\d:([0-5]\d|60)(\.\d+)?Z$";

// Fails closed: if the pattern could not compile, nothing matches.
static VC_DATETIME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(VC_DATETIME_PATTERN).ok());

/// Returns true if `s` matches [`VC_DATETIME_PATTERN`].
pub fn is_vc_datetime(s: &str) -> bool {
    VC_DATETIME_RE.as_ref().is_some_and(|re| re.is_match(s))
}

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from an ISO8601 string, rejecting non-UTC offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string with a `Z` suffix.
    ///
    /// Explicit offsets, `+00:00` included, are rejected. Fractional
    /// seconds are accepted and truncated.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTimestamp` if the string is not valid
    /// RFC 3339 or uses a non-`Z` offset.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp {
                value: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }

        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| CoreError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Absolute distance between two timestamps, in whole seconds.
    pub fn abs_diff_secs(&self, other: &Timestamp) -> u64 {
        self.epoch_secs().abs_diff(other.epoch_secs())
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn display_matches_iso8601() {
        let dt = Utc.with_ymd_and_hms(2026, 6, 30, 23, 59, 59).unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(format!("{ts}"), ts.to_iso8601());
    }

    #[test]
    fn parse_accepts_z_and_truncates_fraction() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.123456Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("2026-01-15T08:00:00-04:00").is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2026-01-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn abs_diff_is_symmetric() {
        let a = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let b = Timestamp::parse("2026-01-15T12:05:00Z").unwrap();
        assert_eq!(a.abs_diff_secs(&b), 300);
        assert_eq!(b.abs_diff_secs(&a), 300);
        assert!(a < b);
    }

    #[test]
    fn vc_datetime_accepts_well_formed() {
        assert!(is_vc_datetime("2010-01-01T19:23:24Z"));
        assert!(is_vc_datetime("2010-01-01T19:23:24.123Z"));
        assert!(is_vc_datetime("1999-12-31T23:59:60Z"));
    }

    #[test]
    fn vc_datetime_rejects_out_of_range_fields() {
        assert!(!is_vc_datetime("2020-13-40T00:00:00Z"));
        assert!(!is_vc_datetime("2020-00-10T00:00:00Z"));
        assert!(!is_vc_datetime("2020-01-01T24:00:00Z"));
        assert!(!is_vc_datetime("2020-01-01T00:60:00Z"));
    }

    #[test]
    fn vc_datetime_rejects_other_shapes() {
        assert!(!is_vc_datetime("2020-01-01"));
        assert!(!is_vc_datetime("2020-01-01T00:00:00"));
        assert!(!is_vc_datetime("2020-01-01T00:00:00+00:00"));
        assert!(!is_vc_datetime("2020-01-01 00:00:00Z"));
        assert!(!is_vc_datetime(" 2020-01-01T00:00:00Z"));
    }

    #[test]
    fn vc_datetime_is_lexical_only() {
        // No calendar check.
        assert!(is_vc_datetime("2021-02-31T00:00:00Z"));
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
