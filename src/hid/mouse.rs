//! HID mouse support
//!
//! Implements HID Boot Protocol mouse reports (USB HID Spec 1.11, Appendix B.2)
//! and the running position shown on the console.

use core::fmt;

use bitflags::bitflags;

use super::constants::BOOT_MOUSE_REPORT_SIZE;

/// HID mouse report (boot protocol)
///
/// Standard 3-byte mouse report format:
/// - Byte 0: Button states
/// - Byte 1: X displacement (signed)
/// - Byte 2: Y displacement (signed)
///
/// Some mice include additional bytes for scroll wheel and extra buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseReport {
    /// Button states
    pub buttons: MouseButtons,
    /// X displacement (relative movement)
    pub x: i8,
    /// Y displacement (relative movement)
    pub y: i8,
    /// Scroll wheel displacement (if present)
    pub wheel: i8,
}

impl MouseReport {
    /// Parse report from raw data
    ///
    /// Supports both 3-byte (basic) and 4-byte (with scroll) reports.
    /// Returns `None` if fewer than 3 bytes were delivered.
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::hid::MouseReport;
    ///
    /// let report = MouseReport::parse(&[0x01, 0x05, 0xFB]).unwrap();
    /// assert!(report.buttons.left());
    /// assert_eq!((report.x, report.y), (5, -5));
    /// ```
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < BOOT_MOUSE_REPORT_SIZE {
            return None;
        }

        Some(Self {
            buttons: MouseButtons::from_bits_retain(data[0]),
            x: data[1] as i8,
            y: data[2] as i8,
            wheel: data.get(3).map_or(0, |&w| w as i8),
        })
    }

    /// Check if mouse moved
    pub fn has_movement(&self) -> bool {
        self.x != 0 || self.y != 0 || self.wheel != 0
    }
}

bitflags! {
    /// Mouse button states
    ///
    /// Standard buttons 1-3 are defined by the boot protocol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons: u8 {
        /// Button 1 (left button)
        const LEFT   = 0b00000001;
        /// Button 2 (right button)
        const RIGHT  = 0b00000010;
        /// Button 3 (middle button / wheel click)
        const MIDDLE = 0b00000100;
    }
}

impl MouseButtons {
    /// Check if left button is pressed
    pub fn left(&self) -> bool {
        self.contains(Self::LEFT)
    }

    /// Check if right button is pressed
    pub fn right(&self) -> bool {
        self.contains(Self::RIGHT)
    }
}

/// Position and button state for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseRecord {
    /// Accumulated X position
    pub x: i32,
    /// Accumulated Y position
    pub y: i32,
    /// Button 1 held
    pub button1: bool,
    /// Button 2 held
    pub button2: bool,
}

impl fmt::Display for MouseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |held: bool| if held { 'o' } else { ' ' };
        write!(
            f,
            "X:{:06} Y:{:06} |{}|{}|",
            self.x,
            self.y,
            mark(self.button1),
            mark(self.button2)
        )
    }
}

/// Accumulates relative displacement into an absolute position
///
/// The counters wrap at the `i32` limits instead of overflowing; they exist
/// only for display, so a wrapped value is harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseTracker {
    x: i32,
    y: i32,
}

impl MouseTracker {
    /// Start at the origin
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Apply one report and return the record to display
    pub fn apply(&mut self, report: &MouseReport) -> MouseRecord {
        self.x = self.x.wrapping_add(report.x as i32);
        self.y = self.y.wrapping_add(report.y as i32);

        MouseRecord {
            x: self.x,
            y: self.y,
            button1: report.buttons.left(),
            button2: report.buttons.right(),
        }
    }

    /// Current position
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Return to the origin
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_report_rejected() {
        assert!(MouseReport::parse(&[0x01, 0x02]).is_none());
        assert!(MouseReport::parse(&[]).is_none());
    }

    #[test]
    fn test_wheel_byte_optional() {
        let report = MouseReport::parse(&[0x00, 0x00, 0x00, 0xFF]).unwrap();
        assert_eq!(report.wheel, -1);
        assert!(report.has_movement());

        let report = MouseReport::parse(&[0x00, 0x00, 0x00]).unwrap();
        assert_eq!(report.wheel, 0);
        assert!(!report.has_movement());
    }

    #[test]
    fn test_position_accumulates() {
        let mut tracker = MouseTracker::new();
        tracker.apply(&MouseReport::parse(&[0x00, 10, 0xF6]).unwrap());
        let record = tracker.apply(&MouseReport::parse(&[0x03, 0xFB, 4]).unwrap());

        assert_eq!((record.x, record.y), (5, -6));
        assert!(record.button1);
        assert!(record.button2);
    }

    #[test]
    fn test_position_wraps_at_limits() {
        let mut tracker = MouseTracker { x: i32::MAX, y: i32::MIN };
        let record = tracker.apply(&MouseReport::parse(&[0x00, 1, 0xFF]).unwrap());
        assert_eq!(record.x, i32::MIN);
        assert_eq!(record.y, i32::MAX);
    }

    #[test]
    fn test_record_display() {
        let record = MouseRecord { x: 12, y: -5, button1: true, button2: false };
        let mut text = heapless::String::<32>::new();
        core::fmt::write(&mut text, format_args!("{}", record)).unwrap();
        assert_eq!(text.as_str(), "X:000012 Y:-00005 |o| |");
    }
}
