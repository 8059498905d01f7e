//! Device collaborator interface
//!
//! The USB host stack owns enumeration, transfers and the driver worker
//! thread. This crate only needs the handful of calls below to read reports
//! and to bring a device from "connected" to "streaming".

use core::fmt;

use crate::config::AppConfig;
use crate::error::{ConfigStep, HidError, Result};
use crate::hid::constants::{set_idle_value, HidProtocol, HidProtocolMode, HidRequest, HidSubclass};

/// Interface parameters of a HID device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceParams {
    /// Interface subclass
    pub subclass: HidSubclass,
    /// Interface protocol
    pub protocol: HidProtocol,
}

impl DeviceParams {
    /// Parameters of a boot keyboard
    pub const BOOT_KEYBOARD: Self = Self::new(HidSubclass::Boot, HidProtocol::Keyboard);

    /// Parameters of a boot mouse
    pub const BOOT_MOUSE: Self = Self::new(HidSubclass::Boot, HidProtocol::Mouse);

    /// Parameters of a report-protocol-only device
    pub const GENERIC: Self = Self::new(HidSubclass::None, HidProtocol::None);

    /// Create from typed parts
    pub const fn new(subclass: HidSubclass, protocol: HidProtocol) -> Self {
        Self { subclass, protocol }
    }

    /// Create from raw interface descriptor fields
    pub const fn from_raw(subclass: u8, protocol: u8) -> Self {
        Self::new(HidSubclass::from_raw(subclass), HidProtocol::from_raw(protocol))
    }

    /// Device uses the boot interface subclass
    pub fn is_boot(&self) -> bool {
        self.subclass == HidSubclass::Boot
    }
}

/// USB HID host stack as seen by the application
///
/// Implemented by the platform glue (or by a mock in tests). Every method
/// reports failure as [`HidError::DeviceError`] or a more specific error;
/// none of them may block for long.
pub trait HidHost {
    /// Opaque per-device handle issued by the stack
    type Handle: Copy + Eq + fmt::Debug;

    /// Interface subclass and protocol of a device
    fn device_params(&mut self, handle: Self::Handle) -> Result<DeviceParams>;

    /// Copy the latest raw input report into `buf`, returning its length
    fn read_input_report(&mut self, handle: Self::Handle, buf: &mut [u8]) -> Result<usize>;

    /// Open the device so it can deliver interface events
    fn open(&mut self, handle: Self::Handle) -> Result<()>;

    /// Issue a HID class request to the device's interface
    fn class_request(&mut self, handle: Self::Handle, request: HidRequest, value: u16) -> Result<()>;

    /// Start report delivery
    fn start(&mut self, handle: Self::Handle) -> Result<()>;

    /// Close the device
    fn close(&mut self, handle: Self::Handle) -> Result<()>;

    /// Number of devices attached to the host library, tracked or not
    fn device_count(&mut self) -> Result<usize>;
}

/// Bring a freshly connected device to the streaming state
///
/// Internally performs:
/// - open
/// - SET_PROTOCOL (boot mode), boot-subclass devices only
/// - SET_IDLE (disable auto-repeat), boot keyboards only
/// - start
///
/// The first failing call aborts the sequence with
/// [`HidError::ConfigurationFailed`] naming the step. Nothing is retried.
pub fn configure_device<H: HidHost>(
    host: &mut H,
    handle: H::Handle,
    params: DeviceParams,
    config: &AppConfig,
) -> Result<()> {
    let step = |step: ConfigStep| move |_: HidError| HidError::ConfigurationFailed(step);

    host.open(handle).map_err(step(ConfigStep::Open))?;

    if params.is_boot() {
        host.class_request(handle, HidRequest::SetProtocol, HidProtocolMode::Boot as u16)
            .map_err(step(ConfigStep::SetProtocol))?;

        if params.protocol == HidProtocol::Keyboard && config.set_idle_for_keyboards {
            // 0 = infinite duration (no auto-repeat)
            host.class_request(handle, HidRequest::SetIdle, set_idle_value(0, 0))
                .map_err(step(ConfigStep::SetIdle))?;
        }
    }

    host.start(handle).map_err(step(ConfigStep::Start))?;

    Ok(())
}
