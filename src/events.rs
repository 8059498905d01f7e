//! Cross-context event queue
//!
//! Two producers feed one consumer:
//! - the trigger interrupt (button edge), which must never block
//! - the USB driver's worker thread, reporting connect/disconnect/error
//!
//! Input reports never travel through this queue; only rare control events
//! do. The queue is bounded and lossy: a full queue drops the new event and
//! keeps the older ones.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use heapless::Deque;

use crate::config::EVENT_QUEUE_DEPTH;
use crate::error::{HidError, Result};

/// Lifecycle notification from the USB driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleEvent {
    /// Device attached and enumerated by the driver
    Connected,
    /// Device removed
    Disconnected,
    /// Interrupt transfer failed
    TransferError,
}

/// Per-interface notification delivered on the driver thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceEvent {
    /// New input report available
    InputReport,
    /// Interface gone
    Disconnected,
    /// Transfer on the interface failed
    TransferError,
}

impl InterfaceEvent {
    /// Lifecycle event forwarded to the consumer, if any
    pub const fn lifecycle(&self) -> Option<LifecycleEvent> {
        match self {
            Self::InputReport => None,
            Self::Disconnected => Some(LifecycleEvent::Disconnected),
            Self::TransferError => Some(LifecycleEvent::TransferError),
        }
    }
}

/// Event handed from a producer context to the consumer loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent<H> {
    /// Trigger input fired; a conditional quit request
    ExternalTrigger,
    /// Something happened to a device
    DeviceLifecycle {
        /// Device handle, owned by the consumer once dequeued
        handle: H,
        /// What happened
        event: LifecycleEvent,
        /// Opaque callback argument from the driver
        arg: usize,
    },
}

/// Bounded multi-producer, single-consumer event queue
///
/// Enqueue runs inside a short critical section and never waits, so it is
/// safe from interrupt context. Dequeue is for the single consumer.
///
/// # Example
///
/// ```
/// use hidline::events::{AppEvent, EventQueue};
///
/// static QUEUE: EventQueue<AppEvent<u8>, 10> = EventQueue::new();
///
/// QUEUE.try_send(AppEvent::ExternalTrigger).unwrap();
/// assert_eq!(QUEUE.try_recv(), Some(AppEvent::ExternalTrigger));
/// ```
pub struct EventQueue<T, const N: usize = EVENT_QUEUE_DEPTH> {
    inner: Mutex<RefCell<Deque<T, N>>>,
    /// Events dropped because the queue was full
    dropped: AtomicU32,
}

impl<T, const N: usize> EventQueue<T, N> {
    /// Create an empty queue (const-compatible, for statics)
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without waiting (interrupt-safe)
    ///
    /// # Errors
    ///
    /// [`HidError::QueueFull`] when all `N` slots are taken; the event is
    /// dropped and counted.
    pub fn try_send(&self, event: T) -> Result<()> {
        let pushed = critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).push_back(event).is_ok()
        });

        if pushed {
            Ok(())
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            Err(HidError::QueueFull)
        }
    }

    /// Dequeue the oldest event, if any
    pub fn try_recv(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
    }

    /// Dequeue, waiting as long as it takes
    ///
    /// This polls: `idle` runs between empty polls and is the only thing
    /// keeping the wait from spinning. Pass [`idle_hint`] or a
    /// platform-specific wait. On a host, the hook should sleep or park the
    /// thread for a short while; producers do not wake it.
    pub fn recv<F: FnMut()>(&self, mut idle: F) -> T {
        loop {
            if let Some(event) = self.try_recv() {
                return event;
            }
            idle();
        }
    }

    /// Events waiting
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    /// Check if no event is waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Events dropped so far on a full queue
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Check if queue is near capacity (> 75%)
    pub fn is_near_full(&self) -> bool {
        self.len() * 4 > N * 3
    }

    /// Discard every pending event, returning how many were dropped
    pub fn reset(&self) -> usize {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow_ref_mut(cs);
            let pending = queue.len();
            queue.clear();
            pending
        })
    }
}

impl<T, const N: usize> Default for EventQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Idle step while the consumer waits for an event
///
/// Waits for an interrupt/event on Cortex-M. On `std` the thread parks for
/// up to a millisecond; this is a host approximation of the interrupt wait,
/// so a queued event may sit that long before it is seen. Spins otherwise.
#[inline]
pub fn idle_hint() {
    #[cfg(feature = "cortex-m")]
    cortex_m::asm::wfe();

    #[cfg(all(not(feature = "cortex-m"), feature = "std"))]
    std::thread::park_timeout(core::time::Duration::from_millis(1));

    #[cfg(all(not(feature = "cortex-m"), not(feature = "std")))]
    core::hint::spin_loop();
}

/// One-shot handshake raised once the USB host library is installed
///
/// The application waits on it with a bounded poll budget and carries on
/// regardless of the outcome.
#[derive(Debug, Default)]
pub struct InstallSignal {
    raised: AtomicBool,
}

impl InstallSignal {
    /// Unraised signal
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Mark installation complete
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Check without waiting
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Poll up to `budget` times, calling `idle` between polls
    ///
    /// Returns whether the signal was seen. A timeout is logged, not fatal.
    pub fn wait<F: FnMut()>(&self, budget: u32, mut idle: F) -> bool {
        for _ in 0..budget {
            if self.is_raised() {
                return true;
            }
            idle();
        }

        let raised = self.is_raised();
        if !raised {
            log::warn!("USB host install not confirmed, continuing");
        }
        raised
    }
}
