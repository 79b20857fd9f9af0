//! Parsing and formatting of playback positions.
//!
//! Positions are accepted as plain seconds (`"75"`, `"75.5"`) or as
//! colon-separated clock values (`"1:15"`, `"1:02:03.5"`).
//!
//! # Example
//!
//! ```
//! use reprise::timecode::{format_seconds, Timecode};
//!
//! let t: Timecode = "1:15".parse().unwrap();
//! assert_eq!(t.seconds(), 75.0);
//! assert_eq!(format_seconds(75.0), "1:15");
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A playback position in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timecode(f64);

impl Timecode {
    /// Wrap a raw number of seconds.
    #[must_use]
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    /// The position in seconds.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.0
    }
}

/// Error returned when a timecode string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid timecode '{input}': {reason}")]
pub struct ParseTimecodeError {
    input: String,
    reason: &'static str,
}

impl ParseTimecodeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

impl FromStr for Timecode {
    type Err = ParseTimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ParseTimecodeError::new(s, "empty"));
        }

        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() > 3 {
            return Err(ParseTimecodeError::new(s, "too many ':' separators"));
        }

        // Only the last component may carry a fraction.
        let (last, leading) = parts
            .split_last()
            .ok_or_else(|| ParseTimecodeError::new(s, "empty"))?;

        let seconds: f64 = last
            .parse()
            .map_err(|_| ParseTimecodeError::new(s, "seconds is not a number"))?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ParseTimecodeError::new(s, "seconds must be non-negative"));
        }
        if !leading.is_empty() && seconds >= 60.0 {
            return Err(ParseTimecodeError::new(s, "seconds must be below 60"));
        }

        let mut total = seconds;
        let mut scale = 60.0;
        for (index, part) in leading.iter().rev().enumerate() {
            let value: u32 = part
                .parse()
                .map_err(|_| ParseTimecodeError::new(s, "minutes and hours must be integers"))?;
            // Minutes in an h:mm:ss value are bounded like seconds.
            if index == 0 && leading.len() == 2 && value >= 60 {
                return Err(ParseTimecodeError::new(s, "minutes must be below 60"));
            }
            total += f64::from(value) * scale;
            scale *= 60.0;
        }

        Ok(Self(total))
    }
}

impl std::fmt::Display for Timecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_seconds(self.0))
    }
}

/// Format seconds as `m:ss` or `h:mm:ss`.
///
/// A fractional part is kept to one decimal place when present.
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--:--".to_string();
    }

    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let whole = tenths / 10;
    let fraction = tenths % 10;

    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;

    let clock = if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    };

    if fraction > 0 {
        format!("{}.{}", clock, fraction)
    } else {
        clock
    }
}
