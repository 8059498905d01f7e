//! Shared test utilities for hidline integration tests
//!
//! Mocks for the device and transport collaborators plus builders for raw
//! boot reports.

#![allow(dead_code)]

pub mod mock_host;

pub use mock_host::{HostCall, MockHost, RecordingConsole, RecordingTransport};

/// Raw 8-byte boot keyboard report
pub fn keyboard_report(modifiers: u8, keys: &[u8]) -> [u8; 8] {
    assert!(keys.len() <= 6, "boot report holds at most 6 keys");
    let mut report = [0u8; 8];
    report[0] = modifiers;
    report[2..2 + keys.len()].copy_from_slice(keys);
    report
}

/// Raw 3-byte boot mouse report
pub fn mouse_report(buttons: u8, dx: i8, dy: i8) -> [u8; 3] {
    [buttons, dx as u8, dy as u8]
}

/// Keycode and shift state that type `ch` on a US layout
pub fn keycode_for(ch: char) -> (u8, bool) {
    match ch {
        'a'..='z' => (0x04 + (ch as u8 - b'a'), false),
        'A'..='Z' => (0x04 + (ch as u8 - b'A'), true),
        '1'..='9' => (0x1E + (ch as u8 - b'1'), false),
        '0' => (0x27, false),
        '\r' => (0x28, false),
        ' ' => (0x2C, false),
        '-' => (0x2D, false),
        _ => panic!("no keycode for {:?} in test helper", ch),
    }
}

/// Press-then-release report pairs typing `text`
///
/// Every character is followed by an all-keys-up report so that repeated
/// characters produce fresh presses.
pub fn type_text(text: &str) -> Vec<[u8; 8]> {
    let mut reports = Vec::new();
    for ch in text.chars() {
        let (code, shift) = keycode_for(ch);
        let modifiers = if shift { 0x02 } else { 0x00 };
        reports.push(keyboard_report(modifiers, &[code]));
        reports.push(keyboard_report(0, &[]));
    }
    reports
}

/// Deterministic pseudo-random byte stream (LCG)
pub struct Lcg(u32);

impl Lcg {
    /// Seeded generator
    pub fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Next byte
    pub fn next_u8(&mut self) -> u8 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 24) as u8
    }

    /// Next value in `0..bound`
    pub fn below(&mut self, bound: u8) -> u8 {
        self.next_u8() % bound
    }
}
