//! Device preferences.
//!
//! Preferences are loaded from YAML or JSON. Every field has a default, so an
//! empty file is valid. Numeric preferences are kept as entered; the
//! validator normalises them at the point of use.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DriverResult;
use crate::validate::Param;

/// How often the hub polls the siren to confirm it is alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckinInterval {
    /// 5 minutes.
    #[serde(rename = "5 Minutes")]
    Minutes5,
    /// 10 minutes.
    #[serde(rename = "10 Minutes")]
    Minutes10,
    /// 15 minutes.
    #[serde(rename = "15 Minutes")]
    Minutes15,
    /// 30 minutes.
    #[serde(rename = "30 Minutes")]
    Minutes30,
    /// 1 hour.
    #[serde(rename = "1 Hour")]
    Hours1,
    /// 2 hours.
    #[serde(rename = "2 Hours")]
    Hours2,
    /// 3 hours.
    #[serde(rename = "3 Hours")]
    Hours3,
    /// 6 hours.
    #[serde(rename = "6 Hours")]
    Hours6,
    /// 9 hours.
    #[serde(rename = "9 Hours")]
    Hours9,
    /// 12 hours.
    #[default]
    #[serde(rename = "12 Hours", alias = "12 Hours   (Default)")]
    Hours12,
    /// 18 hours.
    #[serde(rename = "18 Hours")]
    Hours18,
    /// 24 hours.
    #[serde(rename = "24 Hours")]
    Hours24,
}

impl CheckinInterval {
    /// The interval in minutes.
    pub fn minutes(&self) -> u32 {
        match self {
            CheckinInterval::Minutes5 => 5,
            CheckinInterval::Minutes10 => 10,
            CheckinInterval::Minutes15 => 15,
            CheckinInterval::Minutes30 => 30,
            CheckinInterval::Hours1 => 60,
            CheckinInterval::Hours2 => 120,
            CheckinInterval::Hours3 => 180,
            CheckinInterval::Hours6 => 360,
            CheckinInterval::Hours9 => 540,
            CheckinInterval::Hours12 => 720,
            CheckinInterval::Hours18 => 1080,
            CheckinInterval::Hours24 => 1440,
        }
    }

    /// Period of the health poll for this interval. Short intervals poll at
    /// their own rate, one and two hours poll hourly, anything longer polls
    /// every three hours.
    pub fn poll_period_minutes(&self) -> u32 {
        match self.minutes() {
            m @ (5 | 10 | 15 | 30) => m,
            60 | 120 => 60,
            _ => 180,
        }
    }
}

/// Preferences for one siren.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SirenSettings {
    /// Siren sound for the default alarm (1-5).
    pub siren_sound: Param,
    /// Siren volume for the default alarm (1-3).
    pub siren_volume: Param,
    /// Seconds before the default alarm turns itself off (0 = unlimited).
    pub alarm_duration: Param,
    /// Sound for the default beep (1-5).
    pub beep_sound: Param,
    /// Volume for the default beep (1-3).
    pub beep_volume: Param,
    /// Beeps per default beep.
    pub beep_repeat: Param,
    /// Milliseconds between beeps.
    pub beep_repeat_delay: Param,
    /// Length of a beep in milliseconds.
    pub beep_length: Param,
    /// Seconds between scheduled beeps.
    pub beep_every: Param,
    /// Seconds after which a beep schedule stops.
    pub beep_stop_after: Param,
    /// Route the plain beep command through the beep schedule.
    pub use_beep_schedule_for_beep: bool,
    /// Run the beep schedule before sounding the alarm.
    pub use_beep_delayed_alarm: bool,
    /// Health poll interval.
    pub checkin_interval: CheckinInterval,
}

impl Default for SirenSettings {
    fn default() -> Self {
        SirenSettings {
            siren_sound: Param::Int(5),
            siren_volume: Param::Int(1),
            alarm_duration: Param::Int(0),
            beep_sound: Param::Int(3),
            beep_volume: Param::Int(1),
            beep_repeat: Param::Int(1),
            beep_repeat_delay: Param::Int(1000),
            beep_length: Param::Int(50),
            beep_every: Param::Int(10),
            beep_stop_after: Param::Int(60),
            use_beep_schedule_for_beep: false,
            use_beep_delayed_alarm: false,
            checkin_interval: CheckinInterval::default(),
        }
    }
}

impl SirenSettings {
    /// Parse settings from YAML (JSON is accepted too, being a YAML subset).
    pub fn from_yaml_str(text: &str) -> DriverResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load settings from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> DriverResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Self::from_yaml_str(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate_sound, validate_volume};

    #[test]
    fn test_defaults() {
        let settings = SirenSettings::from_yaml_str("{}").expect("parse");
        assert_eq!(settings, SirenSettings::default());
        assert_eq!(settings.checkin_interval.minutes(), 720);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "sirenSound: 2\nuseBeepDelayedAlarm: true\ncheckinInterval: 30 Minutes\n";
        let settings = SirenSettings::from_yaml_str(yaml).expect("parse");
        assert_eq!(settings.siren_sound, Param::Int(2));
        assert!(settings.use_beep_delayed_alarm);
        assert_eq!(settings.checkin_interval, CheckinInterval::Minutes30);
        assert_eq!(settings.beep_length, Param::Int(50));
    }

    #[test]
    fn test_non_numeric_preference_kept_raw() {
        let settings = SirenSettings::from_yaml_str("sirenSound: loud\nbeepVolume: ~\n").expect("parse");
        assert_eq!(settings.siren_sound, Param::from("loud"));
        assert_eq!(settings.beep_volume, Param::Missing);
        assert_eq!(validate_sound(&settings.siren_sound, 1), 1);
        assert_eq!(validate_volume(&settings.beep_volume), 1);
    }

    #[test]
    fn test_default_interval_label() {
        let settings = SirenSettings::from_yaml_str("checkinInterval: 12 Hours   (Default)\n").expect("parse");
        assert_eq!(settings.checkin_interval, CheckinInterval::Hours12);
        let settings = SirenSettings::from_yaml_str("checkinInterval: 12 Hours\n").expect("parse");
        assert_eq!(settings.checkin_interval, CheckinInterval::Hours12);
    }

    #[test]
    fn test_poll_periods() {
        assert_eq!(CheckinInterval::Minutes15.poll_period_minutes(), 15);
        assert_eq!(CheckinInterval::Hours1.poll_period_minutes(), 60);
        assert_eq!(CheckinInterval::Hours2.poll_period_minutes(), 60);
        assert_eq!(CheckinInterval::Hours3.poll_period_minutes(), 180);
        assert_eq!(CheckinInterval::Hours24.poll_period_minutes(), 180);
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("siren.json");
        std::fs::write(&path, r#"{"beepEvery": 5, "beepStopAfter": 20}"#).expect("write");
        let settings = SirenSettings::load(&path).expect("load");
        assert_eq!(settings.beep_every, Param::Int(5));
        assert_eq!(settings.beep_stop_after, Param::Int(20));
    }
}
