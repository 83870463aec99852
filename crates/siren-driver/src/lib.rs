//! Aeon Labs Siren Driver
//!
//! The device personality of the Aeon Labs Siren: it turns high level
//! intents (alarm on/off, beep patterns, beep schedules, delayed alarms and
//! speech phrases) into ordered command sequences, and turns inbound reports
//! back into status and attribute updates.
//!
//! # Overview
//!
//! - [`SirenDriver`] owns the persisted [`DriverState`] and is the only thing
//!   that mutates it. Every public action returns a `Vec<CommandStep>`.
//! - Delays inside a sequence are [`CommandStep::Delay`] markers for the
//!   transport; nothing blocks.
//! - Timers, wall-clock time and the event sink are provided by a [`Host`].
//!   Timer callbacks come back through [`SirenDriver::on_timer`].
//! - Numeric inputs never fail: [`validate`] clamps or defaults them and logs
//!   the correction.
//!
//! # Example
//!
//! ```rust,ignore
//! use siren_driver::{RecordingHost, SirenDriver, SirenSettings};
//! use siren_protocol::NodeCapabilities;
//!
//! let mut host = RecordingHost::new(0);
//! let mut siren = SirenDriver::new("Siren", SirenSettings::default(), &NodeCapabilities::default());
//!
//! let steps = siren.speak(&mut host, "shortBeep3x 2");
//! for frame in siren.render(&steps) {
//!     println!("{}", frame);
//! }
//! ```

mod driver;
mod encoder;
mod error;
mod host;
mod inbound;
mod schedule;
mod settings;
mod speech;
mod state;
mod status;
mod store;
pub mod validate;

pub use driver::{SirenDriver, CONFIGURE_DELAY_MS};
pub use encoder::{
    alarm_steps, beep_steps, render, total_delay_ms, turn_off_steps, AlarmParams, BeepParams, CommandStep,
    DEFAULT_ALARM_SOUND, DEFAULT_BEEP_SOUND, TURN_OFF_DELAY_MS,
};
pub use error::{DriverError, DriverResult};
pub use host::{ArmedTimer, Attribute, DeviceEvent, Host, RecordingHost, TimerCallback};
pub use inbound::{checkin_time_string, CHECKIN_DEDUPE_MS};
pub use settings::{CheckinInterval, SirenSettings};
pub use speech::{speak_command_help, SpeechAction, SpeechCommand, SPEAK_ARG_SLOTS, SPEAK_COMMANDS};
pub use state::{AlarmDisplay, BeepSchedule, DriverState};
pub use status::DeviceStatus;
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use validate::{Correction, Param};
