//! Aeon Labs Siren Z-Wave Protocol
//!
//! This crate provides the command and report types used to talk to the
//! Aeon Labs Siren (ZW080) over Z-Wave. Only the command classes the siren
//! actually uses are modelled; radio framing and the S0 cryptography are the
//! controller's job.
//!
//! # Protocol Overview
//!
//! Every Z-Wave application frame starts with a command class byte followed
//! by a command byte and command-specific payload:
//!
//! - **Commands** (hub → siren): configuration set/get, switch binary set/get,
//!   basic get, manufacturer specific get, version get
//! - **Reports** (siren → hub): the matching `*_REPORT` frames
//! - **Security**: any frame may be wrapped in a Security Message
//!   Encapsulation (`0x98 0x81`) when the node was included securely
//!
//! # Example
//!
//! ```rust,ignore
//! use siren_protocol::{Command, Report, WireEncoder};
//!
//! // Build a command
//! let cmd = Command::siren_sound_volume(5, 1);
//! let frame = WireEncoder::new(true).format(&cmd);
//!
//! // Parse a report
//! let report = Report::decode_hex("250300")?;
//! ```

mod commands;
mod constants;
mod error;
mod frame;
mod reports;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use reports::*;
