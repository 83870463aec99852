//! Device status values and their family predicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the siren is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceStatus {
    /// Silent.
    #[default]
    Off,
    /// Default alarm sounding.
    Alarm,
    /// Alarm with caller supplied sound, volume and duration.
    CustomAlarm,
    /// Waiting for a delayed alarm timer.
    DelayedAlarm,
    /// Running the default beep schedule, then sounding the alarm.
    BeepDelayedAlarm,
    /// One-shot default beep.
    Beep,
    /// One-shot custom beep.
    CustomBeep,
    /// Running the default beep schedule.
    BeepSchedule,
    /// Running a custom beep schedule.
    CustomBeepSchedule,
}

impl DeviceStatus {
    /// All statuses, in declaration order.
    pub const ALL: [DeviceStatus; 9] = [
        DeviceStatus::Off,
        DeviceStatus::Alarm,
        DeviceStatus::CustomAlarm,
        DeviceStatus::DelayedAlarm,
        DeviceStatus::BeepDelayedAlarm,
        DeviceStatus::Beep,
        DeviceStatus::CustomBeep,
        DeviceStatus::BeepSchedule,
        DeviceStatus::CustomBeepSchedule,
    ];

    /// The attribute value reported for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Off => "off",
            DeviceStatus::Alarm => "alarm",
            DeviceStatus::CustomAlarm => "customAlarm",
            DeviceStatus::DelayedAlarm => "delayedAlarm",
            DeviceStatus::BeepDelayedAlarm => "beepDelayedAlarm",
            DeviceStatus::Beep => "beep",
            DeviceStatus::CustomBeep => "customBeep",
            DeviceStatus::BeepSchedule => "beepSchedule",
            DeviceStatus::CustomBeepSchedule => "customBeepSchedule",
        }
    }

    /// Statuses during which the alarm display is already "both" (or will
    /// become so when the pending alarm sounds).
    pub fn is_alarm_family(&self) -> bool {
        matches!(
            self,
            DeviceStatus::Alarm | DeviceStatus::DelayedAlarm | DeviceStatus::BeepDelayedAlarm
        )
    }

    /// Statuses that sound an alarm immediately.
    pub fn is_sounding_alarm(&self) -> bool {
        matches!(self, DeviceStatus::Alarm | DeviceStatus::CustomAlarm)
    }

    /// Statuses that leave an alarm pending on a timer.
    pub fn is_delayed_alarm(&self) -> bool {
        matches!(self, DeviceStatus::DelayedAlarm | DeviceStatus::BeepDelayedAlarm)
    }

    /// Statuses that run a beep schedule.
    pub fn is_beep_schedule(&self) -> bool {
        matches!(
            self,
            DeviceStatus::BeepDelayedAlarm | DeviceStatus::BeepSchedule | DeviceStatus::CustomBeepSchedule
        )
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_round_trip() {
        for status in DeviceStatus::ALL {
            assert_eq!(status.as_str().parse::<DeviceStatus>(), Ok(status));
        }
        assert!("siren".parse::<DeviceStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_attribute_names() {
        let json = serde_json::to_string(&DeviceStatus::BeepDelayedAlarm).expect("serialize");
        assert_eq!(json, "\"beepDelayedAlarm\"");
    }

    #[test]
    fn test_families() {
        let schedules: Vec<_> = DeviceStatus::ALL.iter().filter(|s| s.is_beep_schedule()).collect();
        assert_eq!(schedules.len(), 3);
        assert!(DeviceStatus::BeepDelayedAlarm.is_delayed_alarm());
        assert!(DeviceStatus::BeepDelayedAlarm.is_alarm_family());
        assert!(!DeviceStatus::CustomAlarm.is_alarm_family());
        assert!(DeviceStatus::CustomAlarm.is_sounding_alarm());
        assert!(!DeviceStatus::Off.is_alarm_family());
    }
}
