//! Protocol constants
//!
//! Command class identifiers, command codes and the siren's configuration
//! parameter numbers.

// ============================================================================
// Command Classes
// ============================================================================

/// Basic command class.
pub const CC_BASIC: u8 = 0x20;
/// Switch Binary command class.
pub const CC_SWITCH_BINARY: u8 = 0x25;
/// Configuration command class.
pub const CC_CONFIGURATION: u8 = 0x70;
/// Manufacturer Specific command class.
pub const CC_MANUFACTURER_SPECIFIC: u8 = 0x72;
/// Version command class.
pub const CC_VERSION: u8 = 0x86;
/// Security (S0) command class.
pub const CC_SECURITY: u8 = 0x98;

// ============================================================================
// Command Codes
// ============================================================================

/// `BASIC_GET`
pub const BASIC_GET: u8 = 0x02;
/// `BASIC_REPORT`
pub const BASIC_REPORT: u8 = 0x03;

/// `SWITCH_BINARY_SET`
pub const SWITCH_BINARY_SET: u8 = 0x01;
/// `SWITCH_BINARY_GET`
pub const SWITCH_BINARY_GET: u8 = 0x02;
/// `SWITCH_BINARY_REPORT`
pub const SWITCH_BINARY_REPORT: u8 = 0x03;

/// `CONFIGURATION_SET`
pub const CONFIGURATION_SET: u8 = 0x04;
/// `CONFIGURATION_GET`
pub const CONFIGURATION_GET: u8 = 0x05;
/// `CONFIGURATION_REPORT`
pub const CONFIGURATION_REPORT: u8 = 0x06;

/// `MANUFACTURER_SPECIFIC_GET`
pub const MANUFACTURER_SPECIFIC_GET: u8 = 0x04;
/// `MANUFACTURER_SPECIFIC_REPORT`
pub const MANUFACTURER_SPECIFIC_REPORT: u8 = 0x05;

/// `VERSION_GET`
pub const VERSION_GET: u8 = 0x11;
/// `VERSION_REPORT`
pub const VERSION_REPORT: u8 = 0x12;

/// `SECURITY_MESSAGE_ENCAPSULATION`
pub const SECURITY_MESSAGE_ENCAPSULATION: u8 = 0x81;

// ============================================================================
// Siren Configuration Parameters
// ============================================================================

/// Siren sound and volume. Two bytes: `[sound 1-5, volume 1-3]`.
pub const PARAM_SIREN_SOUND_VOLUME: u8 = 37;
/// Size of the sound/volume parameter.
pub const PARAM_SIREN_SOUND_VOLUME_SIZE: u8 = 2;
/// Unsolicited notification reports. One byte, 0 disables them.
pub const PARAM_SEND_NOTIFICATIONS: u8 = 80;
/// Size of the notifications parameter.
pub const PARAM_SEND_NOTIFICATIONS_SIZE: u8 = 1;

// ============================================================================
// Switch Values
// ============================================================================

/// Switch binary value for off.
pub const SWITCH_OFF: u8 = 0x00;
/// Switch binary value for on.
pub const SWITCH_ON: u8 = 0xFF;

// ============================================================================
// Device Identity
// ============================================================================

/// Aeon Labs manufacturer id.
pub const AEON_LABS_MANUFACTURER_ID: u16 = 0x0086;
/// Siren product type.
pub const SIREN_PRODUCT_TYPE: u16 = 0x0104;
/// Siren product id (ZW080).
pub const SIREN_PRODUCT_ID: u16 = 0x0050;

/// Command classes the siren advertises in its node information frame.
pub const SIREN_IN_CLUSTERS: &str = "0x5E,0x25,0x70,0x85,0x59,0x72,0x2B,0x2C,0x86,0x7A,0x73,0x98";
