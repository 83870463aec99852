//! Parameter normalisation.
//!
//! Every numeric input reaching the siren (API arguments, speech tokens,
//! preferences) passes through [`validate_range`]. Values that are missing,
//! unparseable or out of range are replaced and the correction is logged;
//! nothing here ever fails.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest burst of beeps, in milliseconds, sent as one command sequence.
pub const MAX_BEEP_MS: i64 = 18_000;

/// Upper bound for values with no natural maximum.
pub const UNBOUNDED: i64 = i32::MAX as i64;

/// Repeat ceiling used when both beep length and repeat delay are zero.
pub const MAX_ZERO_LENGTH_REPEAT: i64 = 100;

/// A raw, not yet validated parameter.
///
/// Serializes untagged: `null`, an integer or a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    /// No value supplied.
    #[default]
    Missing,
    /// An integer value.
    Int(i64),
    /// A textual value, parsed on validation.
    Text(String),
}

impl Param {
    /// Interpret the parameter as an integer, if possible.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Param::Missing => None,
            Param::Int(v) => Some(*v),
            Param::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whether the parameter is absent, empty or zero.
    pub fn is_blank(&self) -> bool {
        match self {
            Param::Missing => true,
            Param::Int(v) => *v == 0,
            Param::Text(s) => s.trim().is_empty(),
        }
    }

    /// Substitute `default` when no value was supplied.
    pub fn or(self, default: i64) -> Param {
        match self {
            Param::Missing => Param::Int(default),
            other => other,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Missing => write!(f, "null"),
            Param::Int(v) => write!(f, "{}", v),
            Param::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Param::Int(v.into())
    }
}

impl From<u32> for Param {
    fn from(v: u32) -> Self {
        Param::Int(v.into())
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<&Param> for Param {
    fn from(v: &Param) -> Self {
        v.clone()
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map_or(Param::Missing, Into::into)
    }
}

/// Why a value was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Missing or not an integer; the default was used.
    Invalid,
    /// Above the maximum; clamped.
    TooHigh,
    /// Below the minimum; clamped.
    TooLow,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::Invalid => write!(f, "invalid"),
            Correction::TooHigh => write!(f, "too high"),
            Correction::TooLow => write!(f, "too low"),
        }
    }
}

/// Normalise `value` into `[min, max]` and report what, if anything, was corrected.
///
/// An unparseable value takes `default`, which is itself clamped.
pub fn check_range(value: &Param, default: i64, min: i64, max: i64) -> (i64, Option<Correction>) {
    let (mut result, mut correction) = match value.as_int() {
        Some(v) => (v, None),
        None => (default, Some(Correction::Invalid)),
    };

    if result > max {
        correction = Some(Correction::TooHigh);
        result = max;
    } else if result < min {
        correction = Some(Correction::TooLow);
        result = min;
    }

    (result, correction)
}

/// Normalise `value` into `[min, max]`, logging any correction under `label`.
pub fn validate_range(value: &Param, default: i64, min: i64, max: i64, label: &str) -> i64 {
    let (result, correction) = check_range(value, default, min, max);
    if let Some(correction) = correction {
        debug!("{}: {} is {}, using {} instead.", label, value, correction, result);
    }
    result
}

/// Siren sound, 1-5.
pub fn validate_sound(sound: &Param, default: i64) -> i64 {
    validate_range(sound, default, 1, 5, "Sound")
}

/// Siren volume, 1-3.
pub fn validate_volume(volume: &Param) -> i64 {
    validate_range(volume, 1, 1, 3, "Volume")
}

/// Length of a single beep in milliseconds.
pub fn validate_beep_length(beep_length_ms: &Param) -> i64 {
    validate_range(beep_length_ms, 50, 0, MAX_BEEP_MS, "Beep Length")
}

/// Pause between beeps, limited to whatever the beep length leaves of the burst.
pub fn validate_repeat_delay(repeat_delay_ms: &Param, beep_length_ms: i64) -> i64 {
    let max = if beep_length_ms >= MAX_BEEP_MS { 0 } else { MAX_BEEP_MS - beep_length_ms };
    validate_range(repeat_delay_ms, 1000, 0, max, "Repeat Delay")
}

/// Number of beeps, limited so the burst fits in [`MAX_BEEP_MS`].
pub fn validate_repeat(repeat: &Param, beep_length_ms: i64, repeat_delay_ms: i64) -> i64 {
    validate_range(repeat, 1, 0, max_repeat(beep_length_ms, repeat_delay_ms), "Repeat")
}

/// Largest repeat count for the given beep length and delay.
pub fn max_repeat(beep_length_ms: i64, repeat_delay_ms: i64) -> i64 {
    let combined = beep_length_ms + repeat_delay_ms;
    if combined >= MAX_BEEP_MS {
        0
    } else if combined <= 0 {
        MAX_ZERO_LENGTH_REPEAT
    } else {
        MAX_BEEP_MS / combined
    }
}

/// Seconds between scheduled beeps.
pub fn validate_beep_every(seconds: &Param) -> i64 {
    validate_range(seconds, 10, 0, UNBOUNDED, "Beep Every")
}

/// Seconds after which a beep schedule stops.
pub fn validate_beep_stop_after(seconds: &Param) -> i64 {
    validate_range(seconds, 60, 2, UNBOUNDED, "Beep Stop After")
}

/// Seconds an alarm sounds before it is switched off (0 = until turned off).
pub fn validate_alarm_duration(seconds: &Param) -> i64 {
    validate_range(seconds, 0, 0, UNBOUNDED, "Alarm Duration")
}

/// Seconds before a delayed alarm sounds.
pub fn validate_alarm_delay(seconds: &Param) -> i64 {
    validate_range(seconds, 3, 1, UNBOUNDED, "delay")
}
