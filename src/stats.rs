//! Pipeline statistics
//!
//! Relaxed atomic counters bumped on the report path. Each counter is read
//! on its own, so a [`PipelineStats::snapshot`] taken while reports are
//! still arriving is not a consistent cut across counters.

use core::sync::atomic::{AtomicU32, Ordering};

/// Counters for the input-report path
pub struct PipelineStats {
    /// Reports decoded successfully
    pub reports_decoded: AtomicU32,
    /// Reports dropped as malformed
    pub reports_dropped: AtomicU32,
    /// Key press transitions seen
    pub key_presses: AtomicU32,
    /// Lines handed to the transport
    pub lines_sent: AtomicU32,
    /// Transport send failures
    pub send_failures: AtomicU32,
    /// Characters dropped on a full line buffer
    pub chars_dropped: AtomicU32,
}

impl PipelineStats {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            reports_decoded: AtomicU32::new(0),
            reports_dropped: AtomicU32::new(0),
            key_presses: AtomicU32::new(0),
            lines_sent: AtomicU32::new(0),
            send_failures: AtomicU32::new(0),
            chars_dropped: AtomicU32::new(0),
        }
    }

    #[inline(always)]
    pub(crate) fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reports_decoded: self.reports_decoded.load(Ordering::Relaxed),
            reports_dropped: self.reports_dropped.load(Ordering::Relaxed),
            key_presses: self.key_presses.load(Ordering::Relaxed),
            lines_sent: self.lines_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            chars_dropped: self.chars_dropped.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.reports_decoded.store(0, Ordering::Relaxed);
        self.reports_dropped.store(0, Ordering::Relaxed);
        self.key_presses.store(0, Ordering::Relaxed);
        self.lines_sent.store(0, Ordering::Relaxed);
        self.send_failures.store(0, Ordering::Relaxed);
        self.chars_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of pipeline counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Reports decoded successfully
    pub reports_decoded: u32,
    /// Reports dropped as malformed
    pub reports_dropped: u32,
    /// Key press transitions seen
    pub key_presses: u32,
    /// Lines accepted by the transport
    pub lines_sent: u32,
    /// Transport send failures
    pub send_failures: u32,
    /// Characters dropped on a full line buffer
    pub chars_dropped: u32,
}

impl StatsSnapshot {
    /// Fraction of reports dropped, as a percentage
    pub fn drop_rate(&self) -> f32 {
        let total = self.reports_decoded + self.reports_dropped;
        if total == 0 {
            return 0.0;
        }
        (self.reports_dropped as f32 / total as f32) * 100.0
    }
}
