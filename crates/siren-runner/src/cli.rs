//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use siren_driver::{Param, SirenDriver};

use crate::sim::SimHost;

/// Play Aeon Labs siren actions on a virtual clock and print what goes over
/// the air.
#[derive(Debug, Parser)]
#[command(name = "siren", version, about)]
pub struct Cli {
    /// Preferences file (YAML or JSON).
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Driver state file. Loaded before the run and saved after it.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Device display name.
    #[arg(long, default_value = "Siren")]
    pub name: String,

    /// Node command class list (e.g. "0x5E,0x25,0x98"). Commands are
    /// security encapsulated when it contains 0x98.
    #[arg(long)]
    pub clusters: Option<String>,

    /// Treat the node as securely included.
    #[arg(long)]
    pub secure: bool,

    /// Virtual start time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub start: Option<String>,

    /// Seconds of virtual time to simulate after the action.
    #[arg(long, default_value_t = 300)]
    pub run_for: u64,

    /// Print the timeline as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Log filter, overrides RUST_LOG (e.g. "debug" or "siren_driver=trace").
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub action: Action,
}

/// Driver action to run at the start of the simulation.
#[derive(Debug, Clone, Subcommand)]
pub enum Action {
    /// Sound the default alarm.
    On,
    /// Silence the siren.
    Off,
    /// Play the default beep.
    Beep,
    /// One short beep.
    ShortBeep { volume: Option<String> },
    /// Three short beeps.
    ShortBeep3x { volume: Option<String> },
    /// One long beep.
    LongBeep { volume: Option<String> },
    /// Three long beeps.
    LongBeep3x { volume: Option<String> },
    /// Start the default beep schedule.
    StartBeep,
    /// Run the default beep schedule, then sound the alarm.
    StartBeepDelayedAlarm,
    /// Sound an alarm with explicit parameters.
    CustomAlarm {
        sound: Option<String>,
        volume: Option<String>,
        duration: Option<String>,
    },
    /// Sound an alarm after a delay.
    DelayedAlarm {
        sound: Option<String>,
        volume: Option<String>,
        duration: Option<String>,
        delay: Option<String>,
    },
    /// Play a beep burst with explicit parameters.
    CustomBeep {
        sound: Option<String>,
        volume: Option<String>,
        repeat: Option<String>,
        repeat_delay_ms: Option<String>,
        beep_length_ms: Option<String>,
    },
    /// Start a beep schedule with explicit parameters.
    StartCustomBeep {
        beep_every: Option<String>,
        stop_after: Option<String>,
        sound: Option<String>,
        volume: Option<String>,
        repeat: Option<String>,
        repeat_delay_ms: Option<String>,
        beep_length_ms: Option<String>,
    },
    /// Run a speech phrase, e.g. `siren speak "customAlarm 4, 2, 10"`.
    Speak {
        #[arg(num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Apply the preferences (starts the health poll, configures once).
    Updated,
    /// Send the configuration commands.
    Configure,
    /// Deliver an inbound frame given in hex.
    Report { hex: String },
    /// List the supported speech phrases.
    SpeakHelp,
}

impl Action {
    /// Run the action against the driver.
    pub fn apply(&self, driver: &mut SirenDriver, host: &mut SimHost) -> Vec<siren_driver::CommandStep> {
        let p = |v: &Option<String>| Param::from(v.clone());
        match self {
            Action::On => driver.on(host),
            Action::Off => driver.off(host),
            Action::Beep => driver.beep(host),
            Action::ShortBeep { volume } => driver.short_beep(host, p(volume)),
            Action::ShortBeep3x { volume } => driver.short_beep_3x(host, p(volume)),
            Action::LongBeep { volume } => driver.long_beep(host, p(volume)),
            Action::LongBeep3x { volume } => driver.long_beep_3x(host, p(volume)),
            Action::StartBeep => driver.start_beep(host),
            Action::StartBeepDelayedAlarm => driver.start_beep_delayed_alarm(host),
            Action::CustomAlarm { sound, volume, duration } => {
                driver.custom_alarm(host, p(sound), p(volume), p(duration))
            }
            Action::DelayedAlarm { sound, volume, duration, delay } => {
                driver.delayed_alarm(host, p(sound), p(volume), p(duration), p(delay))
            }
            Action::CustomBeep {
                sound,
                volume,
                repeat,
                repeat_delay_ms,
                beep_length_ms,
            } => driver.custom_beep(
                host,
                p(sound),
                p(volume),
                p(repeat),
                p(repeat_delay_ms),
                p(beep_length_ms),
            ),
            Action::StartCustomBeep {
                beep_every,
                stop_after,
                sound,
                volume,
                repeat,
                repeat_delay_ms,
                beep_length_ms,
            } => driver.start_custom_beep(
                host,
                p(beep_every),
                p(stop_after),
                p(sound),
                p(volume),
                p(repeat),
                p(repeat_delay_ms),
                p(beep_length_ms),
            ),
            Action::Speak { text } => driver.speak(host, &text.join(" ")),
            Action::Updated => {
                let settings = driver.settings().clone();
                driver.updated(host, settings)
            }
            Action::Configure => driver.configure(),
            Action::Report { .. } | Action::SpeakHelp => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_alarm() {
        let cli = Cli::try_parse_from(["siren", "--run-for", "20", "custom-alarm", "4", "2", "10"]).expect("parse");
        assert_eq!(cli.run_for, 20);
        match cli.action {
            Action::CustomAlarm { sound, volume, duration } => {
                assert_eq!(sound.as_deref(), Some("4"));
                assert_eq!(volume.as_deref(), Some("2"));
                assert_eq!(duration.as_deref(), Some("10"));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_parse_speak_joins_words() {
        let cli = Cli::try_parse_from(["siren", "speak", "shortBeep3x", "2"]).expect("parse");
        match cli.action {
            Action::Speak { text } => assert_eq!(text.join(" "), "shortBeep3x 2"),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_optional_args_may_be_omitted() {
        let cli = Cli::try_parse_from(["siren", "--secure", "short-beep"]).expect("parse");
        assert!(cli.secure);
        assert!(matches!(cli.action, Action::ShortBeep { volume: None }));
    }
}
