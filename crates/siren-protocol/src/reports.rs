//! Reports received from the siren.

use bytes::{Buf, BufMut};

use crate::constants::*;
use crate::error::ProtocolError;
use crate::frame::from_hex;

/// Reports received from the siren.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Current switch state (0x00 = off).
    SwitchBinary {
        /// Switch value.
        value: u8,
    },

    /// Basic report.
    Basic {
        /// Basic value.
        value: u8,
    },

    /// Value of a configuration parameter.
    Configuration {
        /// Parameter number.
        parameter: u8,
        /// Value size in bytes.
        size: u8,
        /// Raw value bytes.
        value: Vec<u8>,
    },

    /// Manufacturer and product identity.
    ManufacturerSpecific {
        /// Manufacturer id.
        manufacturer_id: u16,
        /// Product type id.
        product_type: u16,
        /// Product id.
        product_id: u16,
    },

    /// Firmware and protocol versions.
    Version {
        /// Z-Wave library type.
        library_type: u8,
        /// Z-Wave protocol version.
        protocol_version: u8,
        /// Z-Wave protocol sub version.
        protocol_sub_version: u8,
        /// Application version.
        application_version: u8,
        /// Application sub version.
        application_sub_version: u8,
    },

    /// A frame wrapped in Security Message Encapsulation.
    SecurityMessage {
        /// Sequencing/properties byte.
        properties: u8,
        /// The encapsulated frame.
        payload: Vec<u8>,
    },

    /// A command class or command this crate does not model.
    Unexpected {
        /// Command class byte.
        command_class: u8,
        /// Command byte.
        command: u8,
        /// Remaining payload.
        payload: Vec<u8>,
    },
}

impl Report {
    /// Decode a report from a raw application frame.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        if frame.len() < 2 {
            return Err(ProtocolError::FrameTooShort {
                expected: 2,
                actual: frame.len(),
            });
        }

        let mut buf = frame;
        let command_class = buf.get_u8();
        let command = buf.get_u8();

        match (command_class, command) {
            (CC_SWITCH_BINARY, SWITCH_BINARY_REPORT) => {
                require(frame, 3)?;
                Ok(Report::SwitchBinary { value: buf.get_u8() })
            }

            (CC_BASIC, BASIC_REPORT) => {
                require(frame, 3)?;
                Ok(Report::Basic { value: buf.get_u8() })
            }

            (CC_CONFIGURATION, CONFIGURATION_REPORT) => {
                require(frame, 4)?;
                let parameter = buf.get_u8();
                // Lower three bits carry the size
                let size = buf.get_u8() & 0x07;
                require(frame, 4 + size as usize)?;
                let value = buf[..size as usize].to_vec();
                Ok(Report::Configuration { parameter, size, value })
            }

            (CC_MANUFACTURER_SPECIFIC, MANUFACTURER_SPECIFIC_REPORT) => {
                require(frame, 8)?;
                Ok(Report::ManufacturerSpecific {
                    manufacturer_id: buf.get_u16(),
                    product_type: buf.get_u16(),
                    product_id: buf.get_u16(),
                })
            }

            (CC_VERSION, VERSION_REPORT) => {
                require(frame, 7)?;
                Ok(Report::Version {
                    library_type: buf.get_u8(),
                    protocol_version: buf.get_u8(),
                    protocol_sub_version: buf.get_u8(),
                    application_version: buf.get_u8(),
                    application_sub_version: buf.get_u8(),
                })
            }

            (CC_SECURITY, SECURITY_MESSAGE_ENCAPSULATION) => {
                require(frame, 3)?;
                let properties = buf.get_u8();
                Ok(Report::SecurityMessage {
                    properties,
                    payload: buf.to_vec(),
                })
            }

            _ => Ok(Report::Unexpected {
                command_class,
                command,
                payload: buf.to_vec(),
            }),
        }
    }

    /// Decode a report from a hex string such as `"250300"`.
    pub fn decode_hex(text: &str) -> Result<Self, ProtocolError> {
        Self::decode(&from_hex(text)?)
    }

    /// Decode the frame carried by a security encapsulation.
    ///
    /// Returns `None` for any other report kind.
    pub fn encapsulated(&self) -> Option<Result<Report, ProtocolError>> {
        match self {
            Report::SecurityMessage { payload, .. } if payload.is_empty() => {
                Some(Err(ProtocolError::EmptyEncapsulation))
            }
            Report::SecurityMessage { payload, .. } => Some(Report::decode(payload)),
            _ => None,
        }
    }

    /// Encode the report back into a frame, as the siren would send it.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8);
        match self {
            Report::SwitchBinary { value } => {
                buf.put_u8(CC_SWITCH_BINARY);
                buf.put_u8(SWITCH_BINARY_REPORT);
                buf.put_u8(*value);
            }
            Report::Basic { value } => {
                buf.put_u8(CC_BASIC);
                buf.put_u8(BASIC_REPORT);
                buf.put_u8(*value);
            }
            Report::Configuration { parameter, size, value } => {
                buf.put_u8(CC_CONFIGURATION);
                buf.put_u8(CONFIGURATION_REPORT);
                buf.put_u8(*parameter);
                buf.put_u8(*size);
                buf.extend_from_slice(value);
            }
            Report::ManufacturerSpecific { manufacturer_id, product_type, product_id } => {
                buf.put_u8(CC_MANUFACTURER_SPECIFIC);
                buf.put_u8(MANUFACTURER_SPECIFIC_REPORT);
                buf.put_u16(*manufacturer_id);
                buf.put_u16(*product_type);
                buf.put_u16(*product_id);
            }
            Report::Version {
                library_type,
                protocol_version,
                protocol_sub_version,
                application_version,
                application_sub_version,
            } => {
                buf.put_u8(CC_VERSION);
                buf.put_u8(VERSION_REPORT);
                buf.put_u8(*library_type);
                buf.put_u8(*protocol_version);
                buf.put_u8(*protocol_sub_version);
                buf.put_u8(*application_version);
                buf.put_u8(*application_sub_version);
            }
            Report::SecurityMessage { properties, payload } => {
                buf.put_u8(CC_SECURITY);
                buf.put_u8(SECURITY_MESSAGE_ENCAPSULATION);
                buf.put_u8(*properties);
                buf.extend_from_slice(payload);
            }
            Report::Unexpected { command_class, command, payload } => {
                buf.put_u8(*command_class);
                buf.put_u8(*command);
                buf.extend_from_slice(payload);
            }
        }
        buf
    }

    /// Short name of the report kind, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Report::SwitchBinary { .. } => "SwitchBinaryReport",
            Report::Basic { .. } => "BasicReport",
            Report::Configuration { .. } => "ConfigurationReport",
            Report::ManufacturerSpecific { .. } => "ManufacturerSpecificReport",
            Report::Version { .. } => "VersionReport",
            Report::SecurityMessage { .. } => "SecurityMessageEncapsulation",
            Report::Unexpected { .. } => "UnexpectedCommand",
        }
    }
}

fn require(frame: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if frame.len() < expected {
        return Err(ProtocolError::FrameTooShort {
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_switch_binary() {
        assert_eq!(Report::decode(&[0x25, 0x03, 0x00]), Ok(Report::SwitchBinary { value: 0 }));
        assert_eq!(Report::decode_hex("2503FF"), Ok(Report::SwitchBinary { value: 0xFF }));
    }

    #[test]
    fn test_decode_configuration() {
        let report = Report::decode(&[0x70, 0x06, 37, 2, 5, 1]).expect("should decode");
        assert_eq!(
            report,
            Report::Configuration {
                parameter: 37,
                size: 2,
                value: vec![5, 1],
            }
        );
    }

    #[test]
    fn test_decode_configuration_truncated() {
        let err = Report::decode(&[0x70, 0x06, 37, 2, 5]).unwrap_err();
        assert_eq!(err, ProtocolError::FrameTooShort { expected: 6, actual: 5 });
    }

    #[test]
    fn test_decode_manufacturer_specific() {
        let report = Report::decode_hex("7205 0086 0104 0050").expect("should decode");
        assert_eq!(
            report,
            Report::ManufacturerSpecific {
                manufacturer_id: AEON_LABS_MANUFACTURER_ID,
                product_type: SIREN_PRODUCT_TYPE,
                product_id: SIREN_PRODUCT_ID,
            }
        );
    }

    #[test]
    fn test_decode_security_encapsulation() {
        let report = Report::decode(&[0x98, 0x81, 0x00, 0x25, 0x03, 0x00]).expect("should decode");
        assert_eq!(report.encapsulated(), Some(Ok(Report::SwitchBinary { value: 0 })));
    }

    #[test]
    fn test_empty_security_encapsulation() {
        let report = Report::decode(&[0x98, 0x81, 0x00]).expect("should decode");
        assert_eq!(report.encapsulated(), Some(Err(ProtocolError::EmptyEncapsulation)));
    }

    #[test]
    fn test_decode_unexpected() {
        let report = Report::decode(&[0x5E, 0x02, 0x01]).expect("should decode");
        assert!(matches!(report, Report::Unexpected { command_class: 0x5E, command: 0x02, .. }));
    }

    #[test]
    fn test_decode_too_short() {
        assert!(Report::decode(&[0x25]).is_err());
        assert!(Report::decode(&[0x25, 0x03]).is_err());
    }

    #[test]
    fn test_encode_version_report() {
        let report = Report::Version {
            library_type: 3,
            protocol_version: 4,
            protocol_sub_version: 5,
            application_version: 1,
            application_sub_version: 6,
        };
        assert_eq!(Report::decode(&report.encode()), Ok(report));
    }
}
