//! Inbound report handling.

use chrono::{Local, TimeZone};
use siren_protocol::{Report, SWITCH_OFF};
use tracing::{debug, trace, warn};

use crate::driver::SirenDriver;
use crate::host::{Attribute, Host};
use crate::state::AlarmDisplay;
use crate::status::DeviceStatus;

/// Inbound frames closer together than this count as one checkin.
pub const CHECKIN_DEDUPE_MS: i64 = 60_000;

/// Local time string used for the `lastCheckin` attribute.
pub fn checkin_time_string(now_ms: i64) -> String {
    match Local.timestamp_millis_opt(now_ms).single() {
        Some(time) => time.format("%m/%d/%Y %I:%M:%S %p").to_string(),
        None => now_ms.to_string(),
    }
}

impl SirenDriver {
    /// Handle a raw inbound frame.
    pub fn parse(&mut self, host: &mut dyn Host, frame: &[u8]) {
        match Report::decode(frame) {
            Ok(report) => self.handle_report(host, report),
            Err(e) => warn!("{}: Unable to parse: {} ({})", self.name, siren_protocol::to_hex(frame), e),
        }
        self.check_in(host);
    }

    /// Handle an inbound frame given as a hex string.
    pub fn parse_hex(&mut self, host: &mut dyn Host, description: &str) {
        match siren_protocol::from_hex(description) {
            Ok(frame) => self.parse(host, &frame),
            Err(e) => {
                warn!("{}: Unable to parse: {} ({})", self.name, description, e);
                self.check_in(host);
            }
        }
    }

    /// Dispatch one decoded report.
    pub fn handle_report(&mut self, host: &mut dyn Host, report: Report) {
        match report {
            Report::SecurityMessage { .. } => match report.encapsulated() {
                Some(Ok(inner)) => self.handle_report(host, inner),
                Some(Err(e)) => warn!("{}: Unable to encapsulate: {} ({})", self.name, report.name(), e),
                None => {}
            },
            Report::SwitchBinary { value } => {
                trace!("{}: SwitchBinaryReport[value: {}]", self.name, value);
                if value == SWITCH_OFF {
                    self.switch_reported_off(host);
                }
            }
            Report::Basic { value } => {
                trace!("{}: BasicReport: {}", self.name, value);
            }
            Report::Configuration { parameter, value, .. } => {
                trace!(
                    "{}: ConfigurationReport[parameterNumber: {}, configurationValue: {:?}]",
                    self.name,
                    parameter,
                    value
                );
            }
            Report::ManufacturerSpecific { .. } => {
                trace!("{}: ManufacturerSpecificReport", self.name);
            }
            Report::Version { .. } => {
                trace!("{}: VersionReport", self.name);
            }
            Report::Unexpected { command_class, command, .. } => {
                warn!(
                    "{}: Unexpected Command: {:#04X} {:#04X}",
                    self.name, command_class, command
                );
            }
        }
    }

    fn switch_reported_off(&mut self, host: &mut dyn Host) {
        self.change_status(host, DeviceStatus::Off);

        let alarm_displayed = self.state.alarm == AlarmDisplay::Both;
        if alarm_displayed {
            debug!("{}: Alarm is off", self.name);
        }
        self.state.alarm = AlarmDisplay::Off;
        self.send_event(host, Attribute::Alarm, AlarmDisplay::Off.as_str(), alarm_displayed);
        self.send_event(host, Attribute::Switch, "off", false);
    }

    fn check_in(&mut self, host: &mut dyn Host) {
        let now = host.now_millis();
        if self
            .state
            .last_checkin_ms
            .is_some_and(|last| last + CHECKIN_DEDUPE_MS > now)
        {
            return;
        }

        debug!("{}: Device Checked In", self.name);
        self.state.last_checkin_ms = Some(now);
        self.send_event(host, Attribute::LastCheckin, &checkin_time_string(now), false);
    }
}

#[cfg(test)]
mod tests {
    use siren_protocol::{encapsulate, NodeCapabilities};

    use super::*;
    use crate::host::RecordingHost;
    use crate::settings::SirenSettings;

    fn driver() -> SirenDriver {
        SirenDriver::new("Siren", SirenSettings::default(), &NodeCapabilities::default())
    }

    #[test]
    fn test_switch_off_report_after_alarm() {
        let mut host = RecordingHost::new(0);
        let mut siren = driver();
        siren.on(&mut host);
        host.take_events();

        siren.parse_hex(&mut host, "250300");
        assert_eq!(siren.status(), DeviceStatus::Off);

        let alarm = host.last_event(Attribute::Alarm).expect("alarm event");
        assert_eq!(alarm.value, "off");
        assert!(alarm.displayed);
        assert!(!host.last_event(Attribute::Switch).expect("switch event").displayed);
        assert_eq!(siren.state().alarm, AlarmDisplay::Off);
    }

    #[test]
    fn test_switch_off_report_when_idle_not_displayed() {
        let mut host = RecordingHost::new(0);
        let mut siren = driver();
        siren.parse_hex(&mut host, "250300");
        assert!(!host.last_event(Attribute::Alarm).expect("alarm event").displayed);
    }

    #[test]
    fn test_switch_on_report_changes_nothing() {
        let mut host = RecordingHost::new(0);
        let mut siren = driver();
        siren.beep(&mut host);
        siren.parse_hex(&mut host, "2503FF");
        assert_eq!(siren.status(), DeviceStatus::Beep);
    }

    #[test]
    fn test_encapsulated_report_unwrapped() {
        let mut host = RecordingHost::new(0);
        let mut siren = driver();
        siren.custom_alarm(&mut host, 2, 2, 0);
        siren.parse(&mut host, &encapsulate(&[0x25, 0x03, 0x00]));
        assert_eq!(siren.status(), DeviceStatus::Off);
    }

    #[test]
    fn test_undecodable_frames_still_check_in() {
        let mut host = RecordingHost::new(0);
        let mut siren = driver();
        siren.parse_hex(&mut host, "zz");
        assert_eq!(siren.state().last_checkin_ms, Some(0));
        siren.parse(&mut host, &[0x25]);
        assert_eq!(siren.status(), DeviceStatus::Off);
    }

    #[test]
    fn test_checkin_deduplicated() {
        let mut host = RecordingHost::new(1_000_000);
        let mut siren = driver();

        siren.parse_hex(&mut host, "7205008601040050");
        host.advance_ms(59_999);
        siren.parse_hex(&mut host, "250300");
        let checkins = host.events.iter().filter(|e| e.attribute == Attribute::LastCheckin).count();
        assert_eq!(checkins, 1);

        host.advance_ms(1);
        siren.parse_hex(&mut host, "86120304010100");
        let checkin = host.last_event(Attribute::LastCheckin).expect("checkin");
        assert!(!checkin.displayed);
        assert_eq!(siren.state().last_checkin_ms, Some(1_060_000));
    }

    #[test]
    fn test_checkin_time_format() {
        let text = checkin_time_string(0);
        assert_eq!(text.len(), "01/01/1970 12:00:00 AM".len());
        assert!(text.ends_with("AM") || text.ends_with("PM"));
    }
}
