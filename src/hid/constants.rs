//! HID protocol constants
//!
//! Standard constants from USB HID Specification 1.11 and HID Usage Tables 1.12

/// HID device class code
pub const HID_CLASS: u8 = 0x03;

/// HID subclass codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HidSubclass {
    /// No subclass
    None = 0x00,
    /// Boot interface subclass
    Boot = 0x01,
}

impl HidSubclass {
    /// Map a raw `bInterfaceSubClass`; unknown values are not boot
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x01 => Self::Boot,
            _ => Self::None,
        }
    }
}

/// HID protocol codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HidProtocol {
    /// No protocol
    None = 0x00,
    /// Keyboard protocol
    Keyboard = 0x01,
    /// Mouse protocol
    Mouse = 0x02,
}

impl HidProtocol {
    /// Map a raw `bInterfaceProtocol`; unknown values map to `None`
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x01 => Self::Keyboard,
            0x02 => Self::Mouse,
            _ => Self::None,
        }
    }

    /// Upper-case name used in log lines
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Keyboard => "KEYBOARD",
            Self::Mouse => "MOUSE",
        }
    }
}

/// HID class-specific requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HidRequest {
    /// Get report
    GetReport = 0x01,
    /// Get idle rate
    GetIdle = 0x02,
    /// Get protocol
    GetProtocol = 0x03,
    /// Set report
    SetReport = 0x09,
    /// Set idle rate
    SetIdle = 0x0A,
    /// Set protocol
    SetProtocol = 0x0B,
}

/// HID protocol modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HidProtocolMode {
    /// Boot protocol (simplified, standard reports)
    Boot = 0x00,
    /// Report protocol (full HID report descriptors)
    Report = 0x01,
}

/// `wValue` for SET_IDLE: duration in 4 ms units (high byte), report id (low byte)
pub const fn set_idle_value(duration: u8, report_id: u8) -> u16 {
    ((duration as u16) << 8) | report_id as u16
}

/// Boot keyboard report size: modifier, reserved, six key slots
pub const BOOT_KEYBOARD_REPORT_SIZE: usize = 8;

/// Boot mouse report size: buttons, X, Y
pub const BOOT_MOUSE_REPORT_SIZE: usize = 3;

/// Keyboard usage: no key pressed
pub const KEY_NONE: u8 = 0x00;

/// Keyboard usage: ErrorRollOver, sent in every slot when too many keys are down
pub const KEY_ERROR_ROLLOVER: u8 = 0x01;

/// Keyboard usage: POSTFail
pub const KEY_POST_FAIL: u8 = 0x02;

/// Keyboard usage: ErrorUndefined, the last sentinel code
pub const KEY_ERROR_UNDEFINED: u8 = 0x03;
