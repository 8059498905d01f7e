//! Edge-triggered key state tracking
//!
//! Boot keyboards report the set of keys currently held, not transitions.
//! [`KeyStateTracker`] keeps the previous set and turns each new report into
//! release and press events by set difference.

use heapless::Vec;

use super::keyboard::{KeyCode, KeyModifiers, KeyboardReport};
use crate::config::MAX_BOOT_KEYS;

/// Direction of a key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyTransition {
    /// Key went down
    Pressed,
    /// Key went up
    Released,
}

/// One key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key that changed
    pub code: KeyCode,
    /// Modifiers of the report that pressed the key; empty on release
    pub modifiers: KeyModifiers,
    /// Press or release
    pub transition: KeyTransition,
}

impl KeyEvent {
    /// Press event
    pub const fn pressed(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code,
            modifiers,
            transition: KeyTransition::Pressed,
        }
    }

    /// Release event
    pub const fn released(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
            transition: KeyTransition::Released,
        }
    }

    /// Check if this is a press
    pub fn is_press(&self) -> bool {
        self.transition == KeyTransition::Pressed
    }
}

/// Events from a single report: at most one release and one press per slot
pub type KeyEvents = Vec<KeyEvent, { 2 * MAX_BOOT_KEYS }>;

/// Previously pressed keys and the diff against each new report
#[derive(Debug, Clone, Default)]
pub struct KeyStateTracker {
    pressed: Vec<KeyCode, MAX_BOOT_KEYS>,
}

impl KeyStateTracker {
    /// Start with no keys held
    pub const fn new() -> Self {
        Self { pressed: Vec::new() }
    }

    /// Keys held as of the last report, in slot order, without duplicates
    pub fn pressed(&self) -> &[KeyCode] {
        &self.pressed
    }

    /// Diff a new report against the held keys
    ///
    /// Releases come first, then presses, each in ascending slot order.
    /// Releases carry no modifiers; presses carry the report's modifiers.
    /// The held set is then replaced by the report's distinct non-sentinel
    /// keys, in order of first appearance, so a code sitting in two slots
    /// yields one press and later one release.
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::hid::{KeyCode, KeyModifiers, KeyStateTracker, KeyboardReport};
    ///
    /// let mut tracker = KeyStateTracker::new();
    /// let events = tracker.update(&KeyboardReport::new(KeyModifiers::empty(), [0x04, 0, 0, 0, 0, 0]));
    /// assert_eq!(events.len(), 1);
    /// assert!(events[0].is_press());
    ///
    /// // Held key: no repeat
    /// let events = tracker.update(&KeyboardReport::new(KeyModifiers::empty(), [0x04, 0, 0, 0, 0, 0]));
    /// assert!(events.is_empty());
    /// assert_eq!(tracker.pressed(), &[KeyCode::A]);
    /// ```
    pub fn update(&mut self, report: &KeyboardReport) -> KeyEvents {
        let mut events = KeyEvents::new();

        // A code repeated across slots is held once
        let mut next: Vec<KeyCode, MAX_BOOT_KEYS> = Vec::new();
        for code in report.keys() {
            if !next.contains(&code) {
                let _ = next.push(code);
            }
        }

        for &code in self.pressed.iter() {
            if !next.contains(&code) {
                let _ = events.push(KeyEvent::released(code));
            }
        }

        for &code in next.iter() {
            if !self.pressed.contains(&code) {
                let _ = events.push(KeyEvent::pressed(code, report.modifiers));
            }
        }

        self.pressed = next;
        events
    }

    /// Forget held keys, e.g. after the device went away
    pub fn reset(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(modifiers: u8, keys: &[u8]) -> KeyboardReport {
        let mut slots = [0u8; MAX_BOOT_KEYS];
        slots[..keys.len()].copy_from_slice(keys);
        KeyboardReport::new(KeyModifiers::from_bits_retain(modifiers), slots)
    }

    #[test]
    fn test_releases_before_presses() {
        let mut tracker = KeyStateTracker::new();
        tracker.update(&report(0, &[0x04, 0x05]));

        let events = tracker.update(&report(0x02, &[0x05, 0x06, 0x07]));
        assert_eq!(
            events.as_slice(),
            &[
                KeyEvent::released(KeyCode::A),
                KeyEvent::pressed(KeyCode::C, KeyModifiers::LEFT_SHIFT),
                KeyEvent::pressed(KeyCode::D, KeyModifiers::LEFT_SHIFT),
            ]
        );
        assert_eq!(tracker.pressed(), &[KeyCode::B, KeyCode::C, KeyCode::D]);
    }

    #[test]
    fn test_release_carries_no_modifier() {
        let mut tracker = KeyStateTracker::new();
        tracker.update(&report(0x22, &[0x04]));
        let events = tracker.update(&report(0x22, &[]));
        assert_eq!(events.as_slice(), &[KeyEvent::released(KeyCode::A)]);
        assert!(events[0].modifiers.is_empty());
    }

    #[test]
    fn test_sentinels_never_held() {
        let mut tracker = KeyStateTracker::new();
        let events = tracker.update(&report(0, &[0x01, 0x01, 0x01, 0x01, 0x01, 0x01]));
        assert!(events.is_empty());
        assert!(tracker.pressed().is_empty());
    }

    #[test]
    fn test_full_rollover_swap() {
        let mut tracker = KeyStateTracker::new();
        tracker.update(&report(0, &[0x04, 0x05, 0x06, 0x07, 0x08, 0x09]));
        let events = tracker.update(&report(0, &[0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]));

        assert_eq!(events.len(), 12);
        assert!(events[..6].iter().all(|e| e.transition == KeyTransition::Released));
        assert!(events[6..].iter().all(|e| e.transition == KeyTransition::Pressed));
    }

    #[test]
    fn test_hardware_order_preserved() {
        let mut tracker = KeyStateTracker::new();
        tracker.update(&report(0, &[0x07, 0x00, 0x04, 0x05]));
        assert_eq!(tracker.pressed(), &[KeyCode::D, KeyCode::A, KeyCode::B]);
    }

    #[test]
    fn test_duplicate_slots_balanced() {
        let mut tracker = KeyStateTracker::new();
        let events = tracker.update(&report(0, &[0x04]));
        assert_eq!(events.as_slice(), &[KeyEvent::pressed(KeyCode::A, KeyModifiers::empty())]);

        // Same key reported twice: still one key down
        let events = tracker.update(&report(0, &[0x04, 0x04]));
        assert!(events.is_empty());
        assert_eq!(tracker.pressed(), &[KeyCode::A]);

        let events = tracker.update(&report(0, &[]));
        assert_eq!(events.as_slice(), &[KeyEvent::released(KeyCode::A)]);
    }

    #[test]
    fn test_duplicate_new_code_pressed_once() {
        let mut tracker = KeyStateTracker::new();
        let events = tracker.update(&report(0, &[0x05, 0x04, 0x05, 0x04]));
        assert_eq!(events.len(), 2);
        assert_eq!(tracker.pressed(), &[KeyCode::B, KeyCode::A]);
    }

    #[test]
    fn test_reset_forgets_keys() {
        let mut tracker = KeyStateTracker::new();
        tracker.update(&report(0, &[0x04]));
        tracker.reset();
        let events = tracker.update(&report(0, &[0x04]));
        assert_eq!(events.len(), 1);
        assert!(events[0].is_press());
    }
}
