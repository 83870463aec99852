//! Commands that can be sent to the siren.

use bytes::BufMut;

use crate::constants::*;

/// Commands that can be sent to the siren.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a configuration parameter.
    ConfigurationSet {
        /// Parameter number.
        parameter: u8,
        /// Declared value size in bytes.
        size: u8,
        /// Raw value bytes.
        value: Vec<u8>,
    },

    /// Read a configuration parameter.
    ConfigurationGet {
        /// Parameter number.
        parameter: u8,
    },

    /// Set the binary switch (0x00 = off, 0xFF = on).
    SwitchBinarySet {
        /// Switch value.
        value: u8,
    },

    /// Request a switch binary report.
    SwitchBinaryGet,

    /// Request a basic report.
    BasicGet,

    /// Request the manufacturer specific report.
    ManufacturerSpecificGet,

    /// Request the version report.
    VersionGet,
}

impl Command {
    /// Select a siren sound and volume. The siren starts sounding as soon as
    /// this parameter is written.
    pub fn siren_sound_volume(sound: u8, volume: u8) -> Self {
        Command::ConfigurationSet {
            parameter: PARAM_SIREN_SOUND_VOLUME,
            size: PARAM_SIREN_SOUND_VOLUME_SIZE,
            value: vec![sound, volume],
        }
    }

    /// Enable or disable unsolicited notification reports.
    pub fn send_notifications(enabled: bool) -> Self {
        Command::ConfigurationSet {
            parameter: PARAM_SEND_NOTIFICATIONS,
            size: PARAM_SEND_NOTIFICATIONS_SIZE,
            value: vec![u8::from(enabled)],
        }
    }

    /// Silence the siren.
    pub fn switch_off() -> Self {
        Command::SwitchBinarySet { value: SWITCH_OFF }
    }

    /// Get the (command class, command) pair for this command.
    pub fn code(&self) -> (u8, u8) {
        match self {
            Command::ConfigurationSet { .. } => (CC_CONFIGURATION, CONFIGURATION_SET),
            Command::ConfigurationGet { .. } => (CC_CONFIGURATION, CONFIGURATION_GET),
            Command::SwitchBinarySet { .. } => (CC_SWITCH_BINARY, SWITCH_BINARY_SET),
            Command::SwitchBinaryGet => (CC_SWITCH_BINARY, SWITCH_BINARY_GET),
            Command::BasicGet => (CC_BASIC, BASIC_GET),
            Command::ManufacturerSpecificGet => (CC_MANUFACTURER_SPECIFIC, MANUFACTURER_SPECIFIC_GET),
            Command::VersionGet => (CC_VERSION, VERSION_GET),
        }
    }

    /// Encode the command as an unencapsulated application frame.
    pub fn encode(&self) -> Vec<u8> {
        let (class, command) = self.code();
        let mut buf = Vec::with_capacity(8);
        buf.put_u8(class);
        buf.put_u8(command);

        match self {
            Command::ConfigurationSet { parameter, size, value } => {
                buf.put_u8(*parameter);
                buf.put_u8(*size);
                buf.extend_from_slice(value);
            }
            Command::ConfigurationGet { parameter } => {
                buf.put_u8(*parameter);
            }
            Command::SwitchBinarySet { value } => {
                buf.put_u8(*value);
            }
            Command::SwitchBinaryGet
            | Command::BasicGet
            | Command::ManufacturerSpecificGet
            | Command::VersionGet => {}
        }

        buf
    }

    /// Format the command as the uppercase hex string a hub accepts.
    pub fn format(&self) -> String {
        crate::frame::to_hex(&self.encode())
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::ConfigurationSet { parameter, size, value } => {
                write!(f, "ConfigurationSet(parameter: {}, size: {}, value: {:?})", parameter, size, value)
            }
            Command::ConfigurationGet { parameter } => {
                write!(f, "ConfigurationGet(parameter: {})", parameter)
            }
            Command::SwitchBinarySet { value } => write!(f, "SwitchBinarySet(value: {})", value),
            Command::SwitchBinaryGet => write!(f, "SwitchBinaryGet"),
            Command::BasicGet => write!(f, "BasicGet"),
            Command::ManufacturerSpecificGet => write!(f, "ManufacturerSpecificGet"),
            Command::VersionGet => write!(f, "VersionGet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_sound_volume() {
        let cmd = Command::siren_sound_volume(5, 1);
        assert_eq!(cmd.encode(), vec![0x70, 0x04, 37, 2, 5, 1]);
        assert_eq!(cmd.format(), "700425020501");
    }

    #[test]
    fn test_encode_send_notifications() {
        let cmd = Command::send_notifications(false);
        assert_eq!(cmd.encode(), vec![0x70, 0x04, 80, 1, 0]);
    }

    #[test]
    fn test_encode_switch() {
        assert_eq!(Command::switch_off().encode(), vec![0x25, 0x01, 0x00]);
        assert_eq!(Command::SwitchBinaryGet.encode(), vec![0x25, 0x02]);
    }

    #[test]
    fn test_encode_gets() {
        assert_eq!(Command::ConfigurationGet { parameter: 37 }.encode(), vec![0x70, 0x05, 37]);
        assert_eq!(Command::ManufacturerSpecificGet.format(), "7204");
        assert_eq!(Command::VersionGet.format(), "8611");
        assert_eq!(Command::BasicGet.format(), "2002");
    }
}
