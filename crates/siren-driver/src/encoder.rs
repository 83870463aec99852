//! Command sequence generation.
//!
//! Every driver action returns an ordered list of [`CommandStep`]s. Delays are
//! declarative: the host transport waits between frames, nothing here sleeps.

use std::fmt;

use serde::{Deserialize, Serialize};
use siren_protocol::{Command, WireEncoder};

use crate::validate::{
    validate_alarm_duration, validate_beep_length, validate_repeat, validate_repeat_delay,
    validate_sound, validate_volume, Param,
};

/// Pause between switching off and reading back the switch state.
pub const TURN_OFF_DELAY_MS: u64 = 100;

/// Default sound for alarms when none is valid.
pub const DEFAULT_ALARM_SOUND: i64 = 1;

/// Default sound for beeps when none is valid.
pub const DEFAULT_BEEP_SOUND: i64 = 3;

/// One element of an outbound command sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStep {
    /// Send a command to the siren.
    Send(Command),
    /// Wait before sending the next command.
    Delay(u64),
}

impl CommandStep {
    /// Declared delay of this step in milliseconds (0 for commands).
    pub fn delay_ms(&self) -> u64 {
        match self {
            CommandStep::Send(_) => 0,
            CommandStep::Delay(ms) => *ms,
        }
    }

    /// Render the step in hub wire form: a hex frame or `delay <ms>`.
    pub fn to_wire(&self, encoder: &WireEncoder) -> String {
        match self {
            CommandStep::Send(command) => encoder.format(command),
            CommandStep::Delay(ms) => format!("delay {}", ms),
        }
    }
}

impl fmt::Display for CommandStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStep::Send(command) => write!(f, "{}", command),
            CommandStep::Delay(ms) => write!(f, "delay {}", ms),
        }
    }
}

/// Sum of all declared delays in a sequence.
pub fn total_delay_ms(steps: &[CommandStep]) -> u64 {
    steps.iter().map(CommandStep::delay_ms).sum()
}

/// Render a whole sequence in hub wire form.
pub fn render(steps: &[CommandStep], encoder: &WireEncoder) -> Vec<String> {
    steps.iter().map(|step| step.to_wire(encoder)).collect()
}

/// Validated alarm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmParams {
    /// Sound, 1-5.
    pub sound: u8,
    /// Volume, 1-3.
    pub volume: u8,
    /// Seconds before switching off (0 = until turned off).
    pub duration_secs: u32,
}

impl AlarmParams {
    /// Normalise raw alarm parameters.
    pub fn validate(sound: &Param, volume: &Param, duration: &Param) -> Self {
        AlarmParams {
            sound: validate_sound(sound, DEFAULT_ALARM_SOUND) as u8,
            volume: validate_volume(volume) as u8,
            duration_secs: validate_alarm_duration(duration) as u32,
        }
    }
}

/// Validated beep parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeepParams {
    /// Sound, 1-5.
    pub sound: u8,
    /// Volume, 1-3.
    pub volume: u8,
    /// Number of beeps in the burst.
    pub repeat: u32,
    /// Pause between beeps.
    pub repeat_delay_ms: u32,
    /// Length of each beep.
    pub beep_length_ms: u32,
}

impl BeepParams {
    /// Normalise raw beep parameters.
    ///
    /// Beep length is settled first, then the delay within what the length
    /// leaves of the burst budget, then the count within the combined cost.
    pub fn validate(
        sound: &Param,
        volume: &Param,
        repeat: &Param,
        repeat_delay_ms: &Param,
        beep_length_ms: &Param,
    ) -> Self {
        let sound = validate_sound(sound, DEFAULT_BEEP_SOUND);
        let volume = validate_volume(volume);
        let beep_length_ms = validate_beep_length(beep_length_ms);
        let repeat_delay_ms = validate_repeat_delay(repeat_delay_ms, beep_length_ms);
        let repeat = validate_repeat(repeat, beep_length_ms, repeat_delay_ms);

        BeepParams {
            sound: sound as u8,
            volume: volume as u8,
            repeat: repeat as u32,
            repeat_delay_ms: repeat_delay_ms as u32,
            beep_length_ms: beep_length_ms as u32,
        }
    }
}

/// Switch the siren off and read the switch back so the hub sees the change.
pub fn turn_off_steps() -> Vec<CommandStep> {
    vec![
        CommandStep::Send(Command::switch_off()),
        CommandStep::Delay(TURN_OFF_DELAY_MS),
        CommandStep::Send(Command::SwitchBinaryGet),
    ]
}

/// Sound an alarm, switching it off again after its duration if one is set.
pub fn alarm_steps(params: &AlarmParams) -> Vec<CommandStep> {
    let mut steps = vec![CommandStep::Send(Command::siren_sound_volume(params.sound, params.volume))];

    if params.duration_secs > 0 {
        steps.push(CommandStep::Delay(u64::from(params.duration_secs) * 1000));
        steps.extend(turn_off_steps());
    }

    steps
}

/// A burst of beeps. Each beep is the sound being selected and then switched
/// off after the beep length.
pub fn beep_steps(params: &BeepParams) -> Vec<CommandStep> {
    let mut steps = Vec::new();

    for index in 1..=params.repeat {
        steps.push(CommandStep::Send(Command::siren_sound_volume(params.sound, params.volume)));

        if params.beep_length_ms > 0 {
            steps.push(CommandStep::Delay(u64::from(params.beep_length_ms)));
        }

        steps.push(CommandStep::Send(Command::switch_off()));

        if params.repeat > 1 && params.repeat_delay_ms > 0 && index < params.repeat {
            steps.push(CommandStep::Delay(u64::from(params.repeat_delay_ms)));
        }
    }

    steps
}
