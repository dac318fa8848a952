//! # Temporal Format Rules — Timezone-Aware ISO 8601
//!
//! NeXus `ISO8601` and `NX_DATE_TIME` values must be timezone-aware
//! timestamps of the form
//!
//! ```text
//! YYYY-MM-DDTHH:MM:SS[.fraction](Z|+HH:MM|-HH:MM)
//! ```
//!
//! A `-00:00` offset is rejected: it is not distinct from `Z` and marks a
//! source that lost its timezone. `+00:00` is accepted.
//!
//! The check is purely lexical. Calendar validity (month 13, hour 25) is
//! not inspected.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lexical shape of an accepted timestamp; the offset is checked separately.
const ISO8601_PATTERN: &str =
    r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2}(?:\.\d*)?)(?P<offset>[+-]\d{2}:\d{2}|Z)$";

static ISO8601: Lazy<Regex> =
    Lazy::new(|| Regex::new(ISO8601_PATTERN).expect("ISO8601_PATTERN is a valid regex"));

/// Offset that is lexically valid but forbidden.
const NEGATIVE_ZERO_OFFSET: &str = "-00:00";

/// Example rendered in format diagnostics.
pub const TIMESTAMP_EXAMPLE: &str = "2022-01-22T12:14:12.05018Z";

/// Whether `s` is a timezone-aware ISO 8601 timestamp accepted by NeXus.
pub fn is_timezone_aware_iso8601(s: &str) -> bool {
    match ISO8601.captures(s) {
        Some(caps) => caps
            .name("offset")
            .is_some_and(|offset| offset.as_str() != NEGATIVE_ZERO_OFFSET),
        None => false,
    }
}
