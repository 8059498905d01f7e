//! HID (Human Interface Device) report handling
//!
//! Everything that happens to a single input report on the driver's
//! callback thread: decoding, key-state diffing, character lookup and the
//! mouse/generic display records.
//!
//! # Supported Devices
//!
//! - **Keyboards**: Boot protocol, US layout character table
//! - **Mice**: Boot protocol with button and position tracking
//! - **Everything else**: Passed through as a bounded hex dump
//!
//! # Boot Protocol
//!
//! - Fixed report format (8 bytes for keyboard, 3-4 bytes for mouse)
//! - No report descriptor parsing needed
//! - Shorter transfers are dropped, never partially decoded
//!
//! # Example
//!
//! ```
//! use hidline::hid::{KeyStateTracker, KeyboardReport};
//!
//! let mut tracker = KeyStateTracker::new();
//! let report = KeyboardReport::parse(&[0x00, 0x00, 0x0B, 0, 0, 0, 0, 0]).unwrap();
//! for event in tracker.update(&report) {
//!     if let Some(ch) = event.code.to_char(event.modifiers.shift()) {
//!         assert_eq!(ch, 'h');
//!     }
//! }
//! ```
//!
//! # Reference
//!
//! - USB HID Specification 1.11: <https://www.usb.org/document-library/device-class-definition-hid-111>
//! - HID Usage Tables 1.12: <https://usb.org/document-library/hid-usage-tables-15>

pub mod constants;
pub mod generic;
pub mod keyboard;
pub mod mouse;
pub mod report;
pub mod tracker;

pub use constants::*;
pub use generic::HexDump;
pub use keyboard::{KeyClass, KeyCode, KeyModifiers, KeyboardReport};
pub use mouse::{MouseButtons, MouseRecord, MouseReport, MouseTracker};
pub use report::{Report, ReportKind};
pub use tracker::{KeyEvent, KeyEvents, KeyStateTracker, KeyTransition};
