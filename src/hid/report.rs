//! Report decoding
//!
//! Turns a raw transfer into a typed view according to the device's
//! interface parameters. Short boot reports are rejected without touching
//! any state; devices outside the boot subclass fall back to a hex dump.

use super::constants::{HidProtocol, BOOT_KEYBOARD_REPORT_SIZE, BOOT_MOUSE_REPORT_SIZE};
use super::generic::HexDump;
use super::keyboard::KeyboardReport;
use super::mouse::MouseReport;
use crate::device::DeviceParams;
use crate::error::{HidError, Result};

/// Which handler a report is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    /// Boot keyboard
    Keyboard,
    /// Boot mouse
    Mouse,
    /// Anything not using the boot protocol
    Generic,
}

impl ReportKind {
    /// Header printed when the report stream switches kind
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Keyboard => "Keyboard",
            Self::Mouse => "Mouse",
            Self::Generic => "Generic",
        }
    }
}

/// Decoded input report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Boot keyboard report
    Keyboard(KeyboardReport),
    /// Boot mouse report
    Mouse(MouseReport),
    /// Uninterpreted report
    Generic(HexDump),
}

impl Report {
    /// Decode `data` for a device with the given parameters
    ///
    /// # Errors
    ///
    /// - [`HidError::ShortReport`] if a boot report is shorter than its layout
    /// - [`HidError::UnsupportedProtocol`] for a boot interface that is
    ///   neither keyboard nor mouse
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::device::DeviceParams;
    /// use hidline::hid::Report;
    /// use hidline::HidError;
    ///
    /// let report = Report::decode(&[0, 0, 0x04, 0, 0, 0, 0, 0], DeviceParams::BOOT_KEYBOARD, 64);
    /// assert!(matches!(report, Ok(Report::Keyboard(_))));
    ///
    /// let short = Report::decode(&[0, 0, 0x04], DeviceParams::BOOT_KEYBOARD, 64);
    /// assert_eq!(short, Err(HidError::ShortReport { expected: 8, actual: 3 }));
    /// ```
    pub fn decode(data: &[u8], params: DeviceParams, dump_limit: usize) -> Result<Self> {
        if !params.is_boot() {
            return Ok(Report::Generic(HexDump::encode(data, dump_limit)));
        }

        match params.protocol {
            HidProtocol::Keyboard => KeyboardReport::parse(data)
                .map(Report::Keyboard)
                .ok_or(HidError::ShortReport {
                    expected: BOOT_KEYBOARD_REPORT_SIZE,
                    actual: data.len(),
                }),
            HidProtocol::Mouse => MouseReport::parse(data)
                .map(Report::Mouse)
                .ok_or(HidError::ShortReport {
                    expected: BOOT_MOUSE_REPORT_SIZE,
                    actual: data.len(),
                }),
            HidProtocol::None => Err(HidError::UnsupportedProtocol),
        }
    }

    /// Handler this report is routed to
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Keyboard(_) => ReportKind::Keyboard,
            Report::Mouse(_) => ReportKind::Mouse,
            Report::Generic(_) => ReportKind::Generic,
        }
    }
}
