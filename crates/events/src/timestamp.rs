//! Timestamp formatting for notification facts.
//!
//! Webhook timestamps are ISO-8601 instants in UTC. They are rendered in the
//! configured display zone as `Fri, 01 Mar 2024 12:00:00 +0000`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::{TimeZoneError, TimestampError};

/// Output pattern: weekday, day, month name, year, 24-hour time, numeric offset.
pub const DISPLAY_PATTERN: &str = "%a, %d %b %Y %H:%M:%S %z";

/// The time zone timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(Tz);

impl DisplayZone {
    /// UTC.
    pub const UTC: DisplayZone = DisplayZone(Tz::UTC);

    /// Parses an IANA zone name such as `"Europe/Berlin"`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeZoneError`] for names not in the tz database.
    pub fn parse(name: &str) -> Result<Self, TimeZoneError> {
        name.trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| TimeZoneError {
                name: name.to_string(),
            })
    }

    /// The IANA name of the zone.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Renders an instant in this zone using [`DISPLAY_PATTERN`].
    pub fn format(self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.0)
            .format(DISPLAY_PATTERN)
            .to_string()
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::UTC
    }
}

/// Parses an ISO-8601 instant, assuming UTC when the input carries no offset.
///
/// Accepted shapes: RFC 3339 (`2024-03-01T12:00:00.000Z`,
/// `2024-03-01T13:00:00+01:00`), unzoned date-times
/// (`2024-03-01T12:00:00`), and bare dates (`2024-03-01`, midnight UTC).
///
/// # Errors
///
/// Returns [`TimestampError`] when none of the shapes match.
pub fn parse_instant(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(TimestampError {
        input: input.to_string(),
    })
}

/// Formats an ISO-8601 instant for display in `zone`.
///
/// # Errors
///
/// Propagates [`TimestampError`] for malformed input.
pub fn format_timestamp(input: &str, zone: DisplayZone) -> Result<String, TimestampError> {
    parse_instant(input).map(|instant| zone.format(instant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fixed_instant_in_utc() {
        assert_eq!(
            format_timestamp("2024-03-01T12:00:00Z", DisplayZone::UTC).unwrap(),
            "Fri, 01 Mar 2024 12:00:00 +0000"
        );
    }

    #[test]
    fn formats_in_target_zone() {
        let berlin = DisplayZone::parse("Europe/Berlin").unwrap();
        assert_eq!(
            format_timestamp("2024-03-01T12:00:00Z", berlin).unwrap(),
            "Fri, 01 Mar 2024 13:00:00 +0100"
        );

        let new_york = DisplayZone::parse("America/New_York").unwrap();
        assert_eq!(
            format_timestamp("2024-07-04T02:30:00Z", new_york).unwrap(),
            "Wed, 03 Jul 2024 22:30:00 -0400"
        );
    }

    #[test]
    fn unzoned_input_is_assumed_utc() {
        assert_eq!(
            format_timestamp("2024-03-01T12:00:00.250", DisplayZone::UTC).unwrap(),
            "Fri, 01 Mar 2024 12:00:00 +0000"
        );
        assert_eq!(
            format_timestamp("2024-03-01", DisplayZone::UTC).unwrap(),
            "Fri, 01 Mar 2024 00:00:00 +0000"
        );
    }

    #[test]
    fn offset_input_is_converted() {
        assert_eq!(
            format_timestamp("2024-03-01T14:00:00+02:00", DisplayZone::UTC).unwrap(),
            "Fri, 01 Mar 2024 12:00:00 +0000"
        );
    }

    #[test]
    fn malformed_input_is_an_error() {
        let err = format_timestamp("yesterday", DisplayZone::UTC).unwrap_err();
        assert_eq!(err.input, "yesterday");
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let err = DisplayZone::parse("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(err.name, "Mars/Olympus_Mons");
    }

    #[test]
    fn default_zone_is_utc() {
        assert_eq!(DisplayZone::default().name(), "UTC");
    }
}
