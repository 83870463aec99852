//! Speech command parsing.
//!
//! Speech text such as `"customAlarm 4, 2, 10"` or `"shortbeep 3"` is
//! reduced to a command token plus up to seven positional arguments and
//! dispatched to the matching driver action. Arguments stay as text until
//! the validator sees them, and missing ones are never defaulted here.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::driver::SirenDriver;
use crate::encoder::CommandStep;
use crate::host::Host;
use crate::validate::Param;

/// Number of positional argument slots a speech command is padded to.
pub const SPEAK_ARG_SLOTS: usize = 7;

/// Phrases accepted by [`SirenDriver::speak`], with their arguments.
pub const SPEAK_COMMANDS: &[&str] = &[
    "on / siren / strobe / both",
    "off",
    "beep",
    "shortBeep [volume]",
    "shortBeep3x [volume]",
    "longBeep [volume]",
    "longBeep3x [volume]",
    "startBeep",
    "startBeepDelayedAlarm",
    "customAlarm sound, volume, duration",
    "delayedAlarm sound, volume, duration, delay",
    "customBeep sound, volume[, repeat, repeatDelayMS, beepLengthMS]",
    "startCustomBeep beepEverySeconds, stopAfterSeconds, sound, volume[, repeat, repeatDelayMS, beepLengthMS]",
];

/// Human readable reference of the supported speech commands.
pub fn speak_command_help() -> String {
    let mut help = String::from("Supported speak commands:\n");
    for phrase in SPEAK_COMMANDS {
        help.push_str("  ");
        help.push_str(phrase);
        help.push('\n');
    }
    help
}

/// Action named by a speech command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechAction {
    /// `on`, `siren`, `strobe` or `both`.
    On,
    Off,
    Beep,
    ShortBeep,
    ShortBeep3x,
    LongBeep,
    LongBeep3x,
    StartBeep,
    StartBeepDelayedAlarm,
    CustomAlarm,
    DelayedAlarm,
    CustomBeep,
    StartCustomBeep,
}

impl SpeechAction {
    /// Look up a lowercase command token.
    pub fn from_token(token: &str) -> Option<Self> {
        let action = match token {
            "on" | "siren" | "strobe" | "both" => SpeechAction::On,
            "off" => SpeechAction::Off,
            "beep" => SpeechAction::Beep,
            "shortbeep" => SpeechAction::ShortBeep,
            "shortbeep3x" => SpeechAction::ShortBeep3x,
            "longbeep" => SpeechAction::LongBeep,
            "longbeep3x" => SpeechAction::LongBeep3x,
            "startbeep" => SpeechAction::StartBeep,
            "startbeepdelayedalarm" => SpeechAction::StartBeepDelayedAlarm,
            "customalarm" => SpeechAction::CustomAlarm,
            "delayedalarm" => SpeechAction::DelayedAlarm,
            "custombeep" => SpeechAction::CustomBeep,
            "startcustombeep" => SpeechAction::StartCustomBeep,
            _ => return None,
        };
        Some(action)
    }
}

impl FromStr for SpeechAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(&s.to_lowercase()).ok_or_else(|| format!("unknown speak command: {}", s))
    }
}

/// A speech phrase split into its command token and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    /// Cleaned phrase.
    pub text: String,
    /// Lowercase command token.
    pub token: String,
    /// Positional arguments as text, padded with [`Param::Missing`].
    pub args: [Param; SPEAK_ARG_SLOTS],
}

impl SpeechCommand {
    /// Clean and split a speech phrase.
    pub fn parse(msg: &str) -> Self {
        let text = clean_speak_msg(msg);
        let (token, rest) = match text.find(' ') {
            Some(index) if index > 0 => (text[..index].to_string(), text[index..].trim()),
            _ => (text.clone(), ""),
        };

        let mut args: [Param; SPEAK_ARG_SLOTS] = Default::default();
        for (slot, word) in args.iter_mut().zip(rest.split(' ').filter(|w| !w.is_empty())) {
            *slot = Param::from(word);
        }

        SpeechCommand { text, token, args }
    }

    /// The action named by the token.
    pub fn action(&self) -> Option<SpeechAction> {
        SpeechAction::from_token(&self.token)
    }

    fn arg(&self, index: usize) -> Param {
        self.args[index].clone()
    }
}

impl fmt::Display for SpeechCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lowercase, trim, turn commas into spaces, drop parentheses and collapse
/// doubled spaces.
fn clean_speak_msg(msg: &str) -> String {
    let mut cleaned = msg
        .to_lowercase()
        .trim()
        .replace(',', " ")
        .replace(['(', ')'], "");
    while cleaned.contains("  ") {
        cleaned = cleaned.replace("  ", " ");
    }
    cleaned.trim().to_string()
}

impl SirenDriver {
    /// Run a speech command.
    ///
    /// Unrecognised phrases produce no commands.
    pub fn speak(&mut self, host: &mut dyn Host, msg: &str) -> Vec<CommandStep> {
        debug!("{}: speak({})", self.name, msg);
        let cmd = SpeechCommand::parse(msg);
        let action = cmd.action();

        let steps = match action {
            Some(SpeechAction::On) => self.both(host),
            Some(SpeechAction::Off) => self.off(host),
            Some(SpeechAction::Beep) => self.beep(host),
            Some(SpeechAction::ShortBeep) => self.short_beep(host, cmd.arg(0)),
            Some(SpeechAction::ShortBeep3x) => self.short_beep_3x(host, cmd.arg(0)),
            Some(SpeechAction::LongBeep) => self.long_beep(host, cmd.arg(0)),
            Some(SpeechAction::LongBeep3x) => self.long_beep_3x(host, cmd.arg(0)),
            Some(SpeechAction::StartBeep) => self.start_beep(host),
            Some(SpeechAction::StartBeepDelayedAlarm) => self.start_beep_delayed_alarm(host),
            Some(SpeechAction::CustomAlarm) => self.custom_alarm(host, cmd.arg(0), cmd.arg(1), cmd.arg(2)),
            Some(SpeechAction::DelayedAlarm) => {
                self.delayed_alarm(host, cmd.arg(0), cmd.arg(1), cmd.arg(2), cmd.arg(3))
            }
            Some(SpeechAction::CustomBeep) => {
                let [sound, volume, repeat, delay, length, ..] = cmd.args.clone();
                self.play_custom_beep(host, sound, volume, [repeat, delay, length])
            }
            Some(SpeechAction::StartCustomBeep) => {
                let [every, stop_after, sound, volume, repeat, delay, length] = cmd.args.clone();
                self.start_custom_beep_schedule(host, every, stop_after, sound, volume, [repeat, delay, length])
            }
            None => Vec::new(),
        };

        if steps.is_empty() && action != Some(SpeechAction::DelayedAlarm) {
            debug!("'{}' is not a valid speak command.", cmd);
        }
        steps
    }
}
