//! Error types for report handling and device lifecycle

use core::fmt;

/// Result type used throughout the crate
pub type Result<T> = core::result::Result<T, HidError>;

/// Step of the boot-device configuration sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigStep {
    /// Reading device parameters
    Parameters,
    /// Opening the device
    Open,
    /// SET_PROTOCOL (boot)
    SetProtocol,
    /// SET_IDLE (no auto-repeat)
    SetIdle,
    /// Starting report delivery
    Start,
}

impl ConfigStep {
    /// Short name used in log lines
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parameters => "get-params",
            Self::Open => "open",
            Self::SetProtocol => "set-protocol",
            Self::SetIdle => "set-idle",
            Self::Start => "start",
        }
    }
}

/// HID host application error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    /// Report shorter than the boot layout requires
    ShortReport {
        /// Minimum length for the protocol
        expected: usize,
        /// Length actually delivered
        actual: usize,
    },
    /// Boot subclass without a keyboard or mouse protocol
    UnsupportedProtocol,
    /// Line buffer has no room left
    BufferFull,
    /// Event queue full, event dropped
    QueueFull,
    /// Handle not tracked by the device table
    UnknownDevice,
    /// Lifecycle event not valid in the current device state
    InvalidTransition,
    /// No free slot in the device table
    DeviceTableFull,
    /// A configuration call failed while bringing a device up
    ConfigurationFailed(ConfigStep),
    /// Device collaborator reported a failure
    DeviceError,
    /// Transport send failed
    TransportFailed,
    /// Transport has no open endpoint
    NotConnected,
}

impl HidError {
    /// Errors that end the lifecycle of the device that caused them
    pub fn is_fatal_for_device(&self) -> bool {
        matches!(self, Self::ConfigurationFailed(_) | Self::DeviceError)
    }

    /// Errors that are dropped silently on the input path
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::ShortReport { .. } | Self::UnsupportedProtocol)
    }
}

impl fmt::Display for HidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortReport { expected, actual } => {
                write!(f, "Short report: {} bytes, need {}", actual, expected)
            }
            Self::UnsupportedProtocol => write!(f, "Unsupported boot protocol"),
            Self::BufferFull => write!(f, "Line buffer full"),
            Self::QueueFull => write!(f, "Event queue full"),
            Self::UnknownDevice => write!(f, "Unknown device handle"),
            Self::InvalidTransition => write!(f, "Invalid lifecycle transition"),
            Self::DeviceTableFull => write!(f, "Device table full"),
            Self::ConfigurationFailed(step) => {
                write!(f, "Device configuration failed at {}", step.name())
            }
            Self::DeviceError => write!(f, "Device error"),
            Self::TransportFailed => write!(f, "Transport send failed"),
            Self::NotConnected => write!(f, "Transport not connected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(HidError::ConfigurationFailed(ConfigStep::SetIdle).is_fatal_for_device());
        assert!(HidError::DeviceError.is_fatal_for_device());
        assert!(!HidError::QueueFull.is_fatal_for_device());

        assert!(HidError::ShortReport { expected: 8, actual: 3 }.is_malformed_input());
        assert!(!HidError::BufferFull.is_malformed_input());
    }
}
