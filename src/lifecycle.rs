//! Per-device lifecycle
//!
//! ```text
//! Disconnected --Connected--> Opened --configured--> Streaming
//!                               |                       |
//!                               +--Disconnected/Error---+--> Closed
//! ```
//!
//! A configuration failure closes the device directly. `Closed` is terminal
//! for that lifecycle; the same handle connecting again starts a new one.

use heapless::Vec;

use crate::config::MAX_TRACKED_DEVICES;
use crate::error::{HidError, Result};
use crate::events::LifecycleEvent;

/// Lifecycle state of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Not known to the application
    Disconnected,
    /// Opened, configuration in progress
    Opened,
    /// Configured and delivering reports
    Streaming,
    /// Closed after removal, error or failed configuration
    Closed,
}

impl DeviceState {
    /// Next state for a driver event
    ///
    /// # Errors
    ///
    /// [`HidError::InvalidTransition`] if the event makes no sense here,
    /// e.g. a disconnect for a device that was never opened.
    pub fn on_event(self, event: LifecycleEvent) -> Result<Self> {
        match (self, event) {
            (Self::Disconnected, LifecycleEvent::Connected) => Ok(Self::Opened),
            (
                Self::Opened | Self::Streaming,
                LifecycleEvent::Disconnected | LifecycleEvent::TransferError,
            ) => Ok(Self::Closed),
            _ => Err(HidError::InvalidTransition),
        }
    }

    /// Device is open (configuring or streaming)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Opened | Self::Streaming)
    }
}

/// Devices known to the consumer loop
///
/// Only the consumer touches the table, so it needs no locking.
#[derive(Debug, Clone)]
pub struct DeviceTable<H, const N: usize = MAX_TRACKED_DEVICES> {
    entries: Vec<(H, DeviceState), N>,
    seen: u32,
}

impl<H: Copy + Eq, const N: usize> DeviceTable<H, N> {
    /// Empty table
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            seen: 0,
        }
    }

    /// Current state of a device; untracked handles are `Disconnected`
    pub fn state(&self, handle: H) -> DeviceState {
        self.find(handle)
            .map_or(DeviceState::Disconnected, |i| self.entries[i].1)
    }

    /// Apply a driver event, returning the new state
    ///
    /// # Errors
    ///
    /// - [`HidError::UnknownDevice`] for a non-connect event on an untracked handle
    /// - [`HidError::InvalidTransition`] if the state machine rejects the event
    /// - [`HidError::DeviceTableFull`] if no slot is free for a new device
    pub fn transition(&mut self, handle: H, event: LifecycleEvent) -> Result<DeviceState> {
        if let Some(i) = self.find(handle) {
            let current = self.entries[i].1;
            let next = match (current, event) {
                (DeviceState::Closed, LifecycleEvent::Connected) => DeviceState::Opened,
                _ => current.on_event(event)?,
            };
            if event == LifecycleEvent::Connected {
                self.seen = self.seen.wrapping_add(1);
            }
            self.entries[i].1 = next;
            return Ok(next);
        }

        if event != LifecycleEvent::Connected {
            return Err(HidError::UnknownDevice);
        }

        let next = DeviceState::Disconnected.on_event(event)?;
        if self.entries.is_full() {
            self.evict_closed()?;
        }
        self.entries
            .push((handle, next))
            .map_err(|_| HidError::DeviceTableFull)?;
        self.seen = self.seen.wrapping_add(1);
        Ok(next)
    }

    /// Record that configuration finished
    pub fn mark_streaming(&mut self, handle: H) -> Result<()> {
        let i = self.find(handle).ok_or(HidError::UnknownDevice)?;
        match self.entries[i].1 {
            DeviceState::Opened => {
                self.entries[i].1 = DeviceState::Streaming;
                Ok(())
            }
            _ => Err(HidError::InvalidTransition),
        }
    }

    /// Close a device whose configuration failed
    pub fn abort(&mut self, handle: H) -> Result<()> {
        let i = self.find(handle).ok_or(HidError::UnknownDevice)?;
        self.entries[i].1 = DeviceState::Closed;
        Ok(())
    }

    /// Devices currently open
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|(_, s)| s.is_active()).count()
    }

    /// Connect events accepted since startup
    pub fn seen(&self) -> u32 {
        self.seen
    }

    /// Forget every device
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn find(&self, handle: H) -> Option<usize> {
        self.entries.iter().position(|(h, _)| *h == handle)
    }

    fn evict_closed(&mut self) -> Result<()> {
        let i = self
            .entries
            .iter()
            .position(|(_, s)| *s == DeviceState::Closed)
            .ok_or(HidError::DeviceTableFull)?;
        self.entries.swap_remove(i);
        Ok(())
    }
}

impl<H: Copy + Eq, const N: usize> Default for DeviceTable<H, N> {
    fn default() -> Self {
        Self::new()
    }
}
