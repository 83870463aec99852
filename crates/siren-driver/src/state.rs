//! Persisted driver state.
//!
//! This record is the only state that must survive a restart. It is written
//! by every entry point and read back by timer callbacks, which is how a
//! callback finds out that its schedule was cleared in the meantime.

use serde::{Deserialize, Serialize};

use crate::encoder::{AlarmParams, BeepParams};
use crate::status::DeviceStatus;

/// Last value reported for the alarm attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlarmDisplay {
    /// Alarm shown as off.
    #[default]
    Off,
    /// Alarm shown as sounding (siren and strobe).
    Both,
}

impl AlarmDisplay {
    /// Attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmDisplay::Off => "off",
            AlarmDisplay::Both => "both",
        }
    }
}

/// A running beep schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeepSchedule {
    /// When the schedule started, milliseconds since the epoch.
    pub start_time_ms: i64,
    /// Seconds between beeps (0 = beep once).
    pub beep_every_secs: i64,
    /// Seconds after the start at which the schedule stops.
    pub stop_after_secs: i64,
    /// The beep played at each firing.
    #[serde(flatten)]
    pub beep: BeepParams,
}

impl BeepSchedule {
    /// Whether a schedule started at `start_time_ms` is still inside its
    /// window at `now_ms`.
    pub fn window_open(start_time_ms: i64, stop_after_secs: i64, now_ms: i64) -> bool {
        now_ms < start_time_ms + stop_after_secs * 1000
    }

    /// Whether the schedule's window is open at `now_ms`.
    pub fn is_open(&self, now_ms: i64) -> bool {
        Self::window_open(self.start_time_ms, self.stop_after_secs, now_ms)
    }

    /// Whether the firing after the current one still lands inside the
    /// window. Evaluated as the same window test with the start shifted back
    /// by one interval.
    pub fn next_is_open(&self, now_ms: i64) -> bool {
        Self::window_open(
            self.start_time_ms - self.beep_every_secs * 1000,
            self.stop_after_secs,
            now_ms,
        )
    }
}

/// Everything the driver persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverState {
    /// Current status.
    pub status: DeviceStatus,
    /// A delayed alarm is waiting for its timer or for a beep schedule to end.
    pub alarm_pending: bool,
    /// A beep schedule is running.
    pub beep_schedule_running: bool,
    /// Parameters captured by a delayed alarm.
    pub scheduled_alarm: Option<AlarmParams>,
    /// The running beep schedule.
    pub beep_schedule: Option<BeepSchedule>,
    /// Last reported alarm attribute value.
    pub alarm: AlarmDisplay,
    /// Time of the last checkin event, milliseconds since the epoch.
    pub last_checkin_ms: Option<i64>,
    /// Whether `configure` has run.
    pub is_configured: bool,
}

impl DriverState {
    /// Clear all pending alarm and schedule state.
    pub fn clear_pending(&mut self) {
        self.alarm_pending = false;
        self.beep_schedule_running = false;
        self.scheduled_alarm = None;
        self.beep_schedule = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(every: i64, stop: i64) -> BeepSchedule {
        BeepSchedule {
            start_time_ms: 1_000_000,
            beep_every_secs: every,
            stop_after_secs: stop,
            beep: BeepParams {
                sound: 3,
                volume: 1,
                repeat: 1,
                repeat_delay_ms: 0,
                beep_length_ms: 50,
            },
        }
    }

    #[test]
    fn test_window() {
        let s = schedule(10, 60);
        assert!(s.is_open(1_000_000));
        assert!(s.is_open(1_059_999));
        assert!(!s.is_open(1_060_000));
    }

    #[test]
    fn test_next_window_shifted_by_interval() {
        let s = schedule(10, 60);
        assert!(s.next_is_open(1_049_999));
        assert!(!s.next_is_open(1_050_000));

        // With no interval the shifted window is the window itself.
        let once = schedule(0, 60);
        assert_eq!(once.next_is_open(1_000_000), once.is_open(1_000_000));
    }

    #[test]
    fn test_state_json_round_trip() {
        let state = DriverState {
            status: DeviceStatus::CustomBeepSchedule,
            beep_schedule_running: true,
            beep_schedule: Some(schedule(10, 60)),
            ..Default::default()
        };
        let json = serde_json::to_string(&state).expect("serialize");
        assert!(json.contains("\"status\":\"customBeepSchedule\""));
        assert!(json.contains("\"beepLengthMs\":50"));
        let back: DriverState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, state);
    }

    #[test]
    fn test_clear_pending() {
        let mut state = DriverState {
            alarm_pending: true,
            beep_schedule_running: true,
            scheduled_alarm: Some(AlarmParams { sound: 1, volume: 1, duration_secs: 0 }),
            beep_schedule: Some(schedule(10, 60)),
            ..Default::default()
        };
        state.clear_pending();
        assert!(!state.alarm_pending && !state.beep_schedule_running);
        assert!(state.scheduled_alarm.is_none() && state.beep_schedule.is_none());
    }
}
