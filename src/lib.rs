#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! USB HID line reader for embedded hosts
//!
//! Decodes boot-protocol keyboard and mouse reports delivered by a USB host
//! stack, turns them into key press/release events, rebuilds the lines typed
//! by keyboard-emulating peripherals (RFID and barcode readers) and hands
//! each completed line to a transport.
//!
//! # Learning Path
//!
//! 1. **Start with reports**: [`hid`] decodes raw bytes and diffs key state
//! 2. **Lines**: [`line`] accumulates characters until the terminator
//! 3. **Wiring**: [`app`] connects the driver callback, the trigger interrupt
//!    and the consumer loop
//!
//! # Core Components
//!
//! - [`hid`] - Boot report decoding, keycode table, key-state tracking
//! - [`line`] - Bounded line buffer and accumulator
//! - [`events`] - Interrupt-safe event queue shared by the producers
//! - [`lifecycle`] - Per-device connection state machine
//! - [`device`] - USB host stack interface and boot configuration sequence
//! - [`transport`] - Outbound line delivery
//! - [`error`] - Error types
//!
//! # Threads of execution
//!
//! | Context            | Runs                                      |
//! |--------------------|-------------------------------------------|
//! | Trigger interrupt  | [`app::signal_trigger`]                   |
//! | USB driver thread  | [`app::ReportPipeline`], [`app::forward_driver_event`] |
//! | Application thread | [`app::EventLoop::run`]                   |

#[cfg(feature = "defmt")]
use defmt as _;

pub mod app;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod hid;
pub mod lifecycle;
pub mod line;
pub mod stats;
pub mod transport;

pub use app::{EventLoop, ReportOutcome, ReportPipeline, ShutdownReport};
pub use config::AppConfig;
pub use device::{DeviceParams, HidHost};
pub use error::{HidError, Result};
pub use events::{AppEvent, EventQueue, LifecycleEvent};
pub use transport::Transport;
