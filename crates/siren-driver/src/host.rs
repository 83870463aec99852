//! The host the driver runs inside.
//!
//! The host owns wall-clock time, timers and the event sink. Timer callbacks
//! come back into the driver as [`TimerCallback`] messages through
//! [`SirenDriver::on_timer`](crate::SirenDriver::on_timer); the driver never
//! runs concurrently with itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named timer callbacks the driver arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimerCallback {
    /// A delayed alarm is due.
    PlayPendingAlarm,
    /// The next beep of a beep schedule is due.
    PlayNextBeep,
    /// Periodic liveness poll.
    HealthPoll,
}

impl TimerCallback {
    /// Handler name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TimerCallback::PlayPendingAlarm => "playPendingAlarm",
            TimerCallback::PlayNextBeep => "playNextBeep",
            TimerCallback::HealthPoll => "healthPoll",
        }
    }
}

impl fmt::Display for TimerCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device attributes the driver reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    /// Current [`DeviceStatus`](crate::DeviceStatus).
    Status,
    /// Alarm capability value (`off` or `both`).
    Alarm,
    /// Switch capability value (`on` or `off`).
    Switch,
    /// Time of the last inbound frame.
    LastCheckin,
}

impl Attribute {
    /// Attribute name as reported.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Status => "status",
            Attribute::Alarm => "alarm",
            Attribute::Switch => "switch",
            Attribute::LastCheckin => "lastCheckin",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute update sent to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEvent {
    /// Attribute being updated.
    pub attribute: Attribute,
    /// New value.
    pub value: String,
    /// Whether the update should be shown in the device's activity feed.
    pub displayed: bool,
    /// Human readable description.
    pub description: String,
}

/// Services the host provides to the driver.
pub trait Host {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Run `callback` once after `delay_secs`, replacing any pending run of it.
    fn run_in(&mut self, delay_secs: u64, callback: TimerCallback);

    /// Run `callback` every `period_minutes`, replacing any previous schedule of it.
    fn run_every(&mut self, period_minutes: u32, callback: TimerCallback);

    /// Cancel any pending or periodic run of `callback`.
    fn unschedule(&mut self, callback: TimerCallback);

    /// Deliver an attribute update.
    fn send_event(&mut self, event: DeviceEvent);
}

/// A timer armed on a [`RecordingHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    /// Callback to run.
    pub callback: TimerCallback,
    /// Absolute due time in milliseconds.
    pub due_ms: i64,
    /// Period for recurring timers.
    pub period_minutes: Option<u32>,
}

/// A host with a manual clock that records everything the driver does.
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Current time in milliseconds.
    pub now_ms: i64,
    /// Every event sent, in order.
    pub events: Vec<DeviceEvent>,
    /// Currently armed timers.
    pub timers: Vec<ArmedTimer>,
}

impl RecordingHost {
    /// Create a host whose clock starts at `now_ms`.
    pub fn new(now_ms: i64) -> Self {
        RecordingHost {
            now_ms,
            ..Default::default()
        }
    }

    /// Move the clock forward.
    pub fn advance_ms(&mut self, ms: i64) {
        self.now_ms += ms;
    }

    /// The armed timer for `callback`, if any.
    pub fn timer(&self, callback: TimerCallback) -> Option<&ArmedTimer> {
        self.timers.iter().find(|t| t.callback == callback)
    }

    /// Whether `callback` is armed.
    pub fn is_armed(&self, callback: TimerCallback) -> bool {
        self.timer(callback).is_some()
    }

    /// Remove and return the earliest one-shot timer that is due at or
    /// before the current time.
    pub fn take_due(&mut self) -> Option<TimerCallback> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.period_minutes.is_none() && t.due_ms <= self.now_ms)
            .min_by_key(|(_, t)| t.due_ms)
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index).callback)
    }

    /// Drain the recorded events.
    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Most recent event for `attribute`.
    pub fn last_event(&self, attribute: Attribute) -> Option<&DeviceEvent> {
        self.events.iter().rev().find(|e| e.attribute == attribute)
    }
}

impl Host for RecordingHost {
    fn now_millis(&self) -> i64 {
        self.now_ms
    }

    fn run_in(&mut self, delay_secs: u64, callback: TimerCallback) {
        self.unschedule(callback);
        self.timers.push(ArmedTimer {
            callback,
            due_ms: self.now_ms + (delay_secs as i64) * 1000,
            period_minutes: None,
        });
    }

    fn run_every(&mut self, period_minutes: u32, callback: TimerCallback) {
        self.unschedule(callback);
        self.timers.push(ArmedTimer {
            callback,
            due_ms: self.now_ms + i64::from(period_minutes) * 60_000,
            period_minutes: Some(period_minutes),
        });
    }

    fn unschedule(&mut self, callback: TimerCallback) {
        self.timers.retain(|t| t.callback != callback);
    }

    fn send_event(&mut self, event: DeviceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_in_replaces_pending() {
        let mut host = RecordingHost::new(0);
        host.run_in(5, TimerCallback::PlayPendingAlarm);
        host.run_in(10, TimerCallback::PlayPendingAlarm);
        assert_eq!(host.timers.len(), 1);
        assert_eq!(host.timer(TimerCallback::PlayPendingAlarm).map(|t| t.due_ms), Some(10_000));
    }

    #[test]
    fn test_take_due_in_order() {
        let mut host = RecordingHost::new(0);
        host.run_in(10, TimerCallback::PlayNextBeep);
        host.run_in(5, TimerCallback::PlayPendingAlarm);
        host.run_every(5, TimerCallback::HealthPoll);

        assert_eq!(host.take_due(), None);
        host.advance_ms(10_000);
        assert_eq!(host.take_due(), Some(TimerCallback::PlayPendingAlarm));
        assert_eq!(host.take_due(), Some(TimerCallback::PlayNextBeep));
        assert_eq!(host.take_due(), None);
        assert!(host.is_armed(TimerCallback::HealthPoll));
    }
}
