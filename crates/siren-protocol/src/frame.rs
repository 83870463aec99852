//! Frame formatting and security encapsulation.
//!
//! Hubs exchange Z-Wave application frames as uppercase hex strings. When a
//! node was included securely every outbound command is wrapped in a Security
//! Message Encapsulation header; the controller encrypts the wrapped frame
//! before it goes on air.
//!
//! ```text
//! +------+------+------------+-------------------------+
//! | 0x98 | 0x81 | properties | inner command frame ... |
//! +------+------+------------+-------------------------+
//! ```

use bytes::BufMut;

use crate::commands::Command;
use crate::constants::*;
use crate::error::ProtocolError;

/// Properties byte used for outbound encapsulation (single, unsequenced frame).
pub const ENCAPSULATION_PROPERTIES: u8 = 0x00;

/// Format bytes as an uppercase hex string.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Parse a hex string, ignoring embedded whitespace.
pub fn from_hex(text: &str) -> Result<Vec<u8>, ProtocolError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|e| ProtocolError::InvalidHex(format!("{}: {}", text, e)))
}

/// Wrap a frame in a Security Message Encapsulation header.
pub fn encapsulate(frame: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + frame.len());
    buf.put_u8(CC_SECURITY);
    buf.put_u8(SECURITY_MESSAGE_ENCAPSULATION);
    buf.put_u8(ENCAPSULATION_PROPERTIES);
    buf.extend_from_slice(frame);
    buf
}

/// Command classes a node advertises, used to decide whether commands must
/// be sent securely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeCapabilities {
    /// Advertised command classes.
    pub command_classes: Vec<u8>,
    /// Whether the node was included with security negotiated.
    pub secure_inclusion: bool,
}

impl NodeCapabilities {
    /// Parse an `inClusters` style list such as `"0x5E,0x25,0x98"`.
    ///
    /// Entries may be separated by commas or whitespace and may omit the
    /// `0x` prefix. Unparseable entries are skipped.
    pub fn from_clusters(list: &str) -> Self {
        let command_classes = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .filter_map(|s| {
                let digits = s.trim_start_matches("0x").trim_start_matches("0X");
                u8::from_str_radix(digits, 16).ok()
            })
            .collect();

        NodeCapabilities {
            command_classes,
            secure_inclusion: false,
        }
    }

    /// Mark the node as securely included.
    pub fn with_secure_inclusion(mut self, secure: bool) -> Self {
        self.secure_inclusion = secure;
        self
    }

    /// Check whether a command class is advertised.
    pub fn supports(&self, command_class: u8) -> bool {
        self.command_classes.contains(&command_class)
    }

    /// Whether outbound commands must be security encapsulated.
    pub fn requires_security(&self) -> bool {
        self.secure_inclusion || self.supports(CC_SECURITY)
    }
}

/// Turns commands into the frames handed to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireEncoder {
    secure: bool,
}

impl WireEncoder {
    /// Create an encoder. When `secure` is set every command is encapsulated.
    pub fn new(secure: bool) -> Self {
        WireEncoder { secure }
    }

    /// Create an encoder for a node with the given capabilities.
    pub fn for_node(capabilities: &NodeCapabilities) -> Self {
        WireEncoder::new(capabilities.requires_security())
    }

    /// Whether this encoder encapsulates commands.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Encode a command to bytes, encapsulating when required.
    pub fn encode(&self, command: &Command) -> Vec<u8> {
        let frame = command.encode();
        if self.secure {
            encapsulate(&frame)
        } else {
            frame
        }
    }

    /// Encode a command to the hex string form.
    pub fn format(&self, command: &Command) -> String {
        to_hex(&self.encode(command))
    }
}
