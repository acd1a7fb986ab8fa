//! Fixed-width elapsed-time representation (`00:MM:SS.mmm`) used for storage, ranking and display.
//!
//! Every field is zero-padded, so for values produced by [`format`] the lexicographic order of
//! the strings equals the numeric order of the durations. The ranking code relies on this and
//! sorts raw strings; anything arriving from outside must therefore go through [`parse`] first.

use std::{fmt, str::FromStr, time::Duration};

use thiserror::Error;

/// Largest minute value the codec can represent (the hour field is a fixed literal).
pub const MAX_MINUTES: u32 = 59;
/// Largest second value accepted.
pub const MAX_SECONDS: u32 = 59;
/// Largest millisecond value accepted.
pub const MAX_MILLIS: u32 = 999;

const ENCODED_LEN: usize = 12;
const HOUR_PREFIX: &str = "00:";

/// Raised when a string is not a well-formed, in-range elapsed time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed elapsed time `{input}`: {reason}")]
pub struct MalformedTimeError {
    /// The rejected input, verbatim.
    pub input: String,
    /// Human readable explanation of what is wrong with it.
    pub reason: &'static str,
}

impl MalformedTimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_owned(),
            reason,
        }
    }
}

/// Decoded elapsed time. Ordering follows the duration it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElapsedTime {
    minutes: u32,
    seconds: u32,
    millis: u32,
}

impl ElapsedTime {
    /// Build a value from its components, rejecting out-of-range fields.
    pub fn new(minutes: u32, seconds: u32, millis: u32) -> Option<Self> {
        if minutes > MAX_MINUTES || seconds > MAX_SECONDS || millis > MAX_MILLIS {
            return None;
        }
        Some(Self {
            minutes,
            seconds,
            millis,
        })
    }

    /// Convert a measured duration, clamping anything past `00:59:59.999`.
    pub fn from_duration_saturating(duration: Duration) -> Self {
        let total_ms = duration.as_millis();
        let max_ms = u128::from((MAX_MINUTES * 60 + MAX_SECONDS) * 1000 + MAX_MILLIS);
        let clamped = total_ms.min(max_ms) as u32;
        Self {
            minutes: clamped / 60_000,
            seconds: (clamped / 1000) % 60,
            millis: clamped % 1000,
        }
    }

    /// Minutes component.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Seconds component.
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Milliseconds component.
    pub fn millis(&self) -> u32 {
        self.millis
    }

    /// Total length of the run.
    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(u64::from(
            (self.minutes * 60 + self.seconds) * 1000 + self.millis,
        ))
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{HOUR_PREFIX}{:02}:{:02}.{:03}",
            self.minutes, self.seconds, self.millis
        )
    }
}

impl FromStr for ElapsedTime {
    type Err = MalformedTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (minutes, seconds, millis) = parse(s)?;
        Ok(Self {
            minutes,
            seconds,
            millis,
        })
    }
}

/// Render `00:MM:SS.mmm`. Components are expected in range; use [`ElapsedTime::new`] to check.
pub fn format(minutes: u32, seconds: u32, millis: u32) -> String {
    format!("{HOUR_PREFIX}{minutes:02}:{seconds:02}.{millis:03}")
}

/// Decode `00:MM:SS.mmm` into `(minutes, seconds, milliseconds)`.
///
/// The layout is checked byte by byte (so `0:1:2.3` or `00:01:02.3456` are rejected) and the
/// fields are range-checked afterwards: `00:99:99.999` has the right shape but is still invalid.
pub fn parse(input: &str) -> Result<(u32, u32, u32), MalformedTimeError> {
    let bytes = input.as_bytes();
    if bytes.len() != ENCODED_LEN {
        return Err(MalformedTimeError::new(input, "expected 00:MM:SS.mmm"));
    }
    if !input.starts_with(HOUR_PREFIX) {
        return Err(MalformedTimeError::new(input, "hour field must be `00`"));
    }
    if bytes[5] != b':' || bytes[8] != b'.' {
        return Err(MalformedTimeError::new(input, "expected 00:MM:SS.mmm"));
    }

    let minutes = digits(input, &bytes[3..5])?;
    let seconds = digits(input, &bytes[6..8])?;
    let millis = digits(input, &bytes[9..12])?;

    if minutes > MAX_MINUTES {
        return Err(MalformedTimeError::new(input, "minutes must be within 00..=59"));
    }
    if seconds > MAX_SECONDS {
        return Err(MalformedTimeError::new(input, "seconds must be within 00..=59"));
    }

    Ok((minutes, seconds, millis))
}

/// Parse and re-validate an externally supplied value, returning the canonical string.
pub fn validate(input: &str) -> Result<String, MalformedTimeError> {
    let (minutes, seconds, millis) = parse(input)?;
    Ok(format(minutes, seconds, millis))
}

fn digits(input: &str, field: &[u8]) -> Result<u32, MalformedTimeError> {
    field.iter().try_fold(0u32, |acc, byte| {
        if byte.is_ascii_digit() {
            Ok(acc * 10 + u32::from(byte - b'0'))
        } else {
            Err(MalformedTimeError::new(input, "fields must be ASCII digits"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_fixed_width_fields() {
        assert_eq!(format(1, 23, 456), "00:01:23.456");
        assert_eq!(format(0, 0, 0), "00:00:00.000");
        assert_eq!(format(59, 59, 999), "00:59:59.999");
        assert_eq!(format(0, 5, 7), "00:00:05.007");
    }

    #[test]
    fn parse_inverts_format_across_the_domain() {
        for minutes in [0, 1, 9, 10, 30, 59] {
            for seconds in [0, 1, 9, 10, 59] {
                for millis in [0, 1, 9, 10, 99, 100, 999] {
                    let encoded = format(minutes, seconds, millis);
                    assert_eq!(parse(&encoded), Ok((minutes, seconds, millis)));
                }
            }
        }
    }

    #[test]
    fn string_order_matches_duration_order() {
        let samples = [
            (0, 0, 0),
            (0, 0, 999),
            (0, 1, 0),
            (0, 9, 500),
            (0, 10, 0),
            (1, 22, 0),
            (1, 23, 456),
            (9, 59, 999),
            (10, 0, 0),
            (59, 59, 999),
        ];
        for a in samples {
            for b in samples {
                let lhs = ElapsedTime::new(a.0, a.1, a.2).unwrap();
                let rhs = ElapsedTime::new(b.0, b.1, b.2).unwrap();
                assert_eq!(
                    lhs.to_string() < rhs.to_string(),
                    lhs.as_duration() < rhs.as_duration(),
                    "{lhs} vs {rhs}"
                );
            }
        }
    }

    #[test]
    fn rejects_out_of_range_fields_with_valid_shape() {
        assert!(parse("00:99:99.999").is_err());
        assert!(parse("00:60:00.000").is_err());
        assert!(parse("00:00:60.000").is_err());
    }

    #[test]
    fn rejects_wrong_layout() {
        for input in [
            "",
            "0:1:2.3",
            "00:01:23.4567",
            "00:01:23,456",
            "01:01:23.456",
            "00-01:23.456",
            "00:0a:23.456",
            "00:01:23.45 ",
            "+0:01:23.456",
        ] {
            assert!(parse(input).is_err(), "accepted `{input}`");
        }
    }

    #[test]
    fn duration_conversion_saturates() {
        let elapsed = ElapsedTime::from_duration_saturating(Duration::from_millis(83_456));
        assert_eq!(elapsed.to_string(), "00:01:23.456");

        let overflow = ElapsedTime::from_duration_saturating(Duration::from_secs(2 * 3600));
        assert_eq!(overflow.to_string(), "00:59:59.999");
    }

    #[test]
    fn validate_returns_canonical_string() {
        assert_eq!(validate("00:01:22.000").as_deref(), Ok("00:01:22.000"));
        assert!(validate("00:01:22").is_err());
    }
}
