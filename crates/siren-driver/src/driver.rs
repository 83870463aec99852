//! The siren status machine and its public actions.
//!
//! Every action first moves the driver to a new [`DeviceStatus`] through
//! [`SirenDriver::change_status`], which finalizes whatever the previous
//! status left pending, and then builds the command sequence for the new
//! status.

use siren_protocol::{Command, NodeCapabilities, WireEncoder};
use tracing::{debug, info, trace, warn};

use crate::encoder::{self, alarm_steps, beep_steps, turn_off_steps, AlarmParams, BeepParams, CommandStep};
use crate::host::{Attribute, DeviceEvent, Host, TimerCallback};
use crate::settings::SirenSettings;
use crate::state::{AlarmDisplay, DriverState};
use crate::status::DeviceStatus;
use crate::validate::{validate_alarm_delay, Param};

/// Delay between the two configuration commands.
pub const CONFIGURE_DELAY_MS: u64 = 1000;

/// Driver for one Aeon Labs siren.
#[derive(Debug, Clone)]
pub struct SirenDriver {
    pub(crate) name: String,
    pub(crate) settings: SirenSettings,
    pub(crate) encoder: WireEncoder,
    pub(crate) state: DriverState,
}

impl SirenDriver {
    /// Create a driver with fresh state.
    pub fn new(name: impl Into<String>, settings: SirenSettings, capabilities: &NodeCapabilities) -> Self {
        SirenDriver {
            name: name.into(),
            settings,
            encoder: WireEncoder::for_node(capabilities),
            state: DriverState::default(),
        }
    }

    /// Restore previously persisted state.
    pub fn with_state(mut self, state: DriverState) -> Self {
        self.state = state;
        self
    }

    /// Device display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current preferences.
    pub fn settings(&self) -> &SirenSettings {
        &self.settings
    }

    /// Persisted state.
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Current status.
    pub fn status(&self) -> DeviceStatus {
        self.state.status
    }

    /// Encoder used to turn command steps into wire frames.
    pub fn wire_encoder(&self) -> WireEncoder {
        self.encoder
    }

    /// Render a command sequence in hub wire form.
    pub fn render(&self, steps: &[CommandStep]) -> Vec<String> {
        encoder::render(steps, &self.encoder)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Apply new preferences and restart the health poll. Configures the
    /// siren the first time it is called.
    pub fn updated(&mut self, host: &mut dyn Host, settings: SirenSettings) -> Vec<CommandStep> {
        info!("{}: updated...", self.name);
        self.settings = settings;
        self.start_health_poll_schedule(host);

        if self.state.is_configured {
            Vec::new()
        } else {
            self.configure()
        }
    }

    /// Disable unsolicited notifications and read the switch state.
    pub fn configure(&mut self) -> Vec<CommandStep> {
        warn!("{}: configure...", self.name);
        self.state.is_configured = true;

        vec![
            CommandStep::Send(Command::send_notifications(false)),
            CommandStep::Delay(CONFIGURE_DELAY_MS),
            CommandStep::Send(Command::SwitchBinaryGet),
        ]
    }

    /// Liveness poll. The siren's version report is unreliable, so the
    /// manufacturer specific report is requested instead.
    pub fn health_poll(&self) -> Vec<CommandStep> {
        trace!("{}: healthPoll()", self.name);
        vec![CommandStep::Send(Command::ManufacturerSpecificGet)]
    }

    fn start_health_poll_schedule(&mut self, host: &mut dyn Host) {
        host.unschedule(TimerCallback::HealthPoll);
        host.run_every(
            self.settings.checkin_interval.poll_period_minutes(),
            TimerCallback::HealthPoll,
        );
    }

    /// Entry point for timers armed by the driver.
    ///
    /// A callback whose schedule was cleared since it was armed does nothing.
    pub fn on_timer(&mut self, host: &mut dyn Host, callback: TimerCallback) -> Vec<CommandStep> {
        match callback {
            TimerCallback::PlayPendingAlarm => {
                if !self.state.alarm_pending {
                    trace!("{}: ignoring stale {}", self.name, callback);
                    return Vec::new();
                }
                self.play_pending_alarm(host)
            }
            TimerCallback::PlayNextBeep => {
                debug!("{}: playNextBeep()", self.name);
                if self.state.beep_schedule.is_none() {
                    trace!("{}: ignoring stale {}", self.name, callback);
                    return Vec::new();
                }
                self.play_scheduled_beep(host)
            }
            TimerCallback::HealthPoll => self.health_poll(),
        }
    }

    // ========================================================================
    // Alarm Actions
    // ========================================================================

    /// Sound the default alarm (or the beep-delayed alarm when preferred).
    pub fn on(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: on()", self.name);
        self.turn_on(host)
    }

    /// Same as [`on`](Self::on).
    pub fn siren(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: siren()", self.name);
        self.turn_on(host)
    }

    /// Same as [`on`](Self::on).
    pub fn strobe(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: strobe()", self.name);
        self.turn_on(host)
    }

    /// Same as [`on`](Self::on).
    pub fn both(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: both()", self.name);
        self.turn_on(host)
    }

    fn turn_on(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        trace!("{}: turnOn()", self.name);
        if self.settings.use_beep_delayed_alarm {
            self.start_beep_delayed_alarm(host)
        } else {
            self.change_status(host, DeviceStatus::Alarm);
            self.play_default_alarm(host)
        }
    }

    /// Silence the siren and cancel anything pending.
    pub fn off(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: off()", self.name);
        self.change_status(host, DeviceStatus::Off);
        turn_off_steps()
    }

    /// Sound an alarm with the given sound, volume and duration.
    pub fn custom_alarm(
        &mut self,
        host: &mut dyn Host,
        sound: impl Into<Param>,
        volume: impl Into<Param>,
        duration_secs: impl Into<Param>,
    ) -> Vec<CommandStep> {
        let params = AlarmParams::validate(&sound.into(), &volume.into(), &duration_secs.into());
        debug!(
            "{}: customAlarm({}, {}, {})",
            self.name, params.sound, params.volume, params.duration_secs
        );
        self.change_status(host, DeviceStatus::CustomAlarm);
        self.play_alarm(host, &params)
    }

    /// Capture alarm parameters now and sound them after `delay_secs`.
    pub fn delayed_alarm(
        &mut self,
        host: &mut dyn Host,
        sound: impl Into<Param>,
        volume: impl Into<Param>,
        duration_secs: impl Into<Param>,
        delay_secs: impl Into<Param>,
    ) -> Vec<CommandStep> {
        let delay_secs = delay_secs.into();
        let params = AlarmParams::validate(&sound.into(), &volume.into(), &duration_secs.into());
        debug!(
            "{}: delayedAlarm({}, {}, {}, {})",
            self.name, params.sound, params.volume, params.duration_secs, delay_secs
        );
        self.change_status(host, DeviceStatus::DelayedAlarm);

        self.state.scheduled_alarm = Some(params);
        let delay = validate_alarm_delay(&delay_secs);

        debug!(
            "{}: Starting {} [sound: {}, volume: {}, duration: {}, delay: {}]",
            self.name, self.state.status, params.sound, params.volume, params.duration_secs, delay
        );
        host.run_in(delay as u64, TimerCallback::PlayPendingAlarm);
        Vec::new()
    }

    pub(crate) fn play_default_alarm(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        trace!("{}: playDefaultAlarm()", self.name);
        let params = AlarmParams::validate(
            &self.settings.siren_sound,
            &self.settings.siren_volume,
            &self.settings.alarm_duration,
        );
        self.play_alarm(host, &params)
    }

    pub(crate) fn play_alarm(&mut self, host: &mut dyn Host, params: &AlarmParams) -> Vec<CommandStep> {
        let duration = if params.duration_secs > 0 {
            format!(", duration: {}", params.duration_secs)
        } else {
            String::new()
        };
        debug!(
            "{}: Sounding Alarm: [sound: {}, volume: {}{}]",
            self.name, params.sound, params.volume, duration
        );

        if self.state.status.is_alarm_family() {
            self.state.alarm = AlarmDisplay::Both;
            self.send_event(host, Attribute::Alarm, AlarmDisplay::Both.as_str(), true);
            self.send_event(host, Attribute::Switch, "on", false);
        }

        alarm_steps(params)
    }

    // ========================================================================
    // Beep Actions
    // ========================================================================

    /// Play the default beep (or start the beep schedule when preferred).
    pub fn beep(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: beep()", self.name);
        if self.settings.use_beep_schedule_for_beep {
            self.start_beep(host)
        } else {
            self.change_status(host, DeviceStatus::Beep);
            self.play_default_beep(host)
        }
    }

    /// One short beep.
    pub fn short_beep(&mut self, host: &mut dyn Host, volume: impl Into<Param>) -> Vec<CommandStep> {
        self.custom_beep(host, 3, volume, 1, 0, 50)
    }

    /// One long beep.
    pub fn long_beep(&mut self, host: &mut dyn Host, volume: impl Into<Param>) -> Vec<CommandStep> {
        self.custom_beep(host, 3, volume, 1, 0, 250)
    }

    /// Three short beeps.
    pub fn short_beep_3x(&mut self, host: &mut dyn Host, volume: impl Into<Param>) -> Vec<CommandStep> {
        self.custom_beep(host, 3, volume, 3, 25, 50)
    }

    /// Three long beeps.
    pub fn long_beep_3x(&mut self, host: &mut dyn Host, volume: impl Into<Param>) -> Vec<CommandStep> {
        self.custom_beep(host, 3, volume, 3, 150, 200)
    }

    /// Play a beep burst with the given parameters.
    ///
    /// A blank volume falls back to the beep volume preference. Missing
    /// repeat, delay and length default to 1, 1000 ms and 100 ms.
    pub fn custom_beep(
        &mut self,
        host: &mut dyn Host,
        sound: impl Into<Param>,
        volume: impl Into<Param>,
        repeat: impl Into<Param>,
        repeat_delay_ms: impl Into<Param>,
        beep_length_ms: impl Into<Param>,
    ) -> Vec<CommandStep> {
        let burst = [repeat.into().or(1), repeat_delay_ms.into().or(1000), beep_length_ms.into().or(100)];
        self.play_custom_beep(host, sound.into(), volume.into(), burst)
    }

    /// Custom beep with `[repeat, repeat delay, beep length]` passed through
    /// as given, so missing values take the validator defaults.
    pub(crate) fn play_custom_beep(
        &mut self,
        host: &mut dyn Host,
        sound: Param,
        mut volume: Param,
        burst: [Param; 3],
    ) -> Vec<CommandStep> {
        if volume.is_blank() {
            volume = self.settings.beep_volume.clone();
        }

        let [repeat, repeat_delay_ms, beep_length_ms] = burst;
        let params = BeepParams::validate(&sound, &volume, &repeat, &repeat_delay_ms, &beep_length_ms);
        trace!("{}: customBeep({:?})", self.name, params);

        self.change_status(host, DeviceStatus::CustomBeep);
        self.play_beep(&params)
    }

    pub(crate) fn default_beep_params(&self) -> BeepParams {
        BeepParams::validate(
            &self.settings.beep_sound,
            &self.settings.beep_volume,
            &self.settings.beep_repeat,
            &self.settings.beep_repeat_delay,
            &self.settings.beep_length,
        )
    }

    fn play_default_beep(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        trace!("{}: playDefaultBeep()", self.name);
        let params = self.default_beep_params();
        self.play_beep(&params)
    }

    /// Beep burst, followed by the turn-off sequence unless a schedule or a
    /// pending alarm will carry on afterwards.
    pub(crate) fn play_beep(&self, params: &BeepParams) -> Vec<CommandStep> {
        trace!("{}: playBeep({:?})", self.name, params);
        let mut steps = beep_steps(params);

        if !self.state.beep_schedule_running
            && !self.state.alarm_pending
            && self.state.status != DeviceStatus::Off
        {
            steps.extend(turn_off_steps());
        }

        steps
    }

    // ========================================================================
    // Status Machine
    // ========================================================================

    /// Move to `new_status`, finalizing whatever the current status left
    /// pending, and report the change.
    pub(crate) fn change_status(&mut self, host: &mut dyn Host, new_status: DeviceStatus) {
        let old_status = self.state.status;

        self.finalize_old_status(host, old_status, new_status);

        if new_status.is_delayed_alarm() {
            self.state.alarm_pending = true;
        }
        if new_status.is_beep_schedule() {
            self.state.beep_schedule_running = true;
        }
        self.state.status = new_status;

        let displayed = old_status != new_status
            && new_status != DeviceStatus::Alarm
            && !old_status.is_alarm_family();

        self.send_event(host, Attribute::Status, new_status.as_str(), displayed);
    }

    fn finalize_old_status(&mut self, host: &mut dyn Host, old_status: DeviceStatus, new_status: DeviceStatus) {
        if self.state.alarm_pending && old_status.is_delayed_alarm() && !new_status.is_sounding_alarm() {
            debug!("{}: Delayed Alarm Cancelled", self.name);
        } else if self.state.beep_schedule_running {
            let now = host.now_millis();
            let next_active = self
                .state
                .beep_schedule
                .as_ref()
                .is_some_and(|s| s.next_is_open(now));
            if next_active {
                debug!("{}: Beep Schedule Cancelled", self.name);
            } else {
                debug!("{}: Beep Schedule Completed", self.name);
            }
        }

        self.state.clear_pending();
        host.unschedule(TimerCallback::PlayPendingAlarm);
        host.unschedule(TimerCallback::PlayNextBeep);
    }

    pub(crate) fn send_event(&self, host: &mut dyn Host, attribute: Attribute, value: &str, displayed: bool) {
        let description = format!("{}: {} is {}", self.name, attribute, value);
        if displayed {
            info!("{}", description);
        }
        host.send_event(DeviceEvent {
            attribute,
            value: value.to_string(),
            displayed,
            description,
        });
    }
}
