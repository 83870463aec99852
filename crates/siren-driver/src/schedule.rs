//! Beep schedules and delayed alarms.
//!
//! Both are driven by one named timer each. A firing re-reads the persisted
//! schedule, so a status change in between silently retires it.

use tracing::{debug, trace};

use crate::driver::SirenDriver;
use crate::encoder::{turn_off_steps, AlarmParams, BeepParams, CommandStep};
use crate::host::{Host, TimerCallback};
use crate::state::BeepSchedule;
use crate::status::DeviceStatus;
use crate::validate::{validate_beep_every, validate_beep_stop_after, Param};

impl SirenDriver {
    // ========================================================================
    // Schedule Actions
    // ========================================================================

    /// Start the beep schedule from the beep preferences.
    pub fn start_beep(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        trace!("{}: startBeep()", self.name);
        self.change_status(host, DeviceStatus::BeepSchedule);
        self.start_default_beep_schedule(host)
    }

    /// Run the default beep schedule, then sound the default alarm.
    pub fn start_beep_delayed_alarm(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        debug!("{}: startBeepDelayedAlarm()...", self.name);
        self.change_status(host, DeviceStatus::BeepDelayedAlarm);
        self.start_default_beep_schedule(host)
    }

    /// Start a beep schedule with explicit parameters. Missing repeat, delay
    /// and length default to 1, 1000 ms and 100 ms.
    #[allow(clippy::too_many_arguments)]
    pub fn start_custom_beep(
        &mut self,
        host: &mut dyn Host,
        beep_every_secs: impl Into<Param>,
        stop_after_secs: impl Into<Param>,
        sound: impl Into<Param>,
        volume: impl Into<Param>,
        repeat: impl Into<Param>,
        repeat_delay_ms: impl Into<Param>,
        beep_length_ms: impl Into<Param>,
    ) -> Vec<CommandStep> {
        let burst = [repeat.into().or(1), repeat_delay_ms.into().or(1000), beep_length_ms.into().or(100)];
        self.start_custom_beep_schedule(
            host,
            beep_every_secs.into(),
            stop_after_secs.into(),
            sound.into(),
            volume.into(),
            burst,
        )
    }

    /// Custom beep schedule with `[repeat, repeat delay, beep length]` passed
    /// through as given.
    pub(crate) fn start_custom_beep_schedule(
        &mut self,
        host: &mut dyn Host,
        beep_every_secs: Param,
        stop_after_secs: Param,
        sound: Param,
        volume: Param,
        burst: [Param; 3],
    ) -> Vec<CommandStep> {
        let [repeat, repeat_delay_ms, beep_length_ms] = burst;
        let beep = BeepParams::validate(&sound, &volume, &repeat, &repeat_delay_ms, &beep_length_ms);
        trace!(
            "{}: startCustomBeep({}, {}, {:?})",
            self.name,
            beep_every_secs,
            stop_after_secs,
            beep
        );

        self.change_status(host, DeviceStatus::CustomBeepSchedule);
        self.start_beep_schedule(host, &beep_every_secs, &stop_after_secs, beep)
    }

    fn start_default_beep_schedule(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        let beep = self.default_beep_params();
        let beep_every = self.settings.beep_every.clone();
        let stop_after = self.settings.beep_stop_after.clone();
        self.start_beep_schedule(host, &beep_every, &stop_after, beep)
    }

    fn start_beep_schedule(
        &mut self,
        host: &mut dyn Host,
        beep_every_secs: &Param,
        stop_after_secs: &Param,
        beep: BeepParams,
    ) -> Vec<CommandStep> {
        let schedule = BeepSchedule {
            start_time_ms: host.now_millis(),
            beep_every_secs: validate_beep_every(beep_every_secs),
            stop_after_secs: validate_beep_stop_after(stop_after_secs),
            beep,
        };
        debug!(
            "{}: Starting {} [every: {}s, stop after: {}s]",
            self.name, self.state.status, schedule.beep_every_secs, schedule.stop_after_secs
        );
        self.state.beep_schedule = Some(schedule);

        self.play_scheduled_beep(host)
    }

    // ========================================================================
    // Timer Continuations
    // ========================================================================

    /// One firing of the beep schedule: beep if the window is still open,
    /// then either arm the next firing or complete the schedule.
    pub(crate) fn play_scheduled_beep(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        trace!("{}: playScheduledBeep()", self.name);
        let now = host.now_millis();
        let running = self.state.beep_schedule_running;
        let Some(schedule) = self.state.beep_schedule else {
            return Vec::new();
        };

        let mut steps = Vec::new();
        if running && schedule.is_open(now) {
            steps.extend(self.play_beep(&schedule.beep));
        }

        if running && schedule.next_is_open(now) && schedule.beep_every_secs > 0 {
            host.run_in(schedule.beep_every_secs as u64, TimerCallback::PlayNextBeep);
            return steps;
        }

        debug!("{}: Beep Schedule Completed", self.name);
        self.state.beep_schedule = None;
        self.state.beep_schedule_running = false;

        if self.state.alarm_pending {
            steps.extend(self.play_pending_alarm(host));
        } else {
            steps.extend(turn_off_steps());
        }
        steps
    }

    /// Sound the alarm captured by a delayed alarm, or the default alarm
    /// when none was captured.
    pub(crate) fn play_pending_alarm(&mut self, host: &mut dyn Host) -> Vec<CommandStep> {
        trace!("{}: playPendingAlarm()...", self.name);
        self.state.alarm_pending = false;

        match self.state.scheduled_alarm.take() {
            Some(AlarmParams { sound, volume, duration_secs }) => {
                self.custom_alarm(host, u32::from(sound), u32::from(volume), duration_secs)
            }
            None => self.play_default_alarm(host),
        }
    }
}
