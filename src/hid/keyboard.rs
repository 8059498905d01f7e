//! HID keyboard support
//!
//! Implements HID Boot Protocol keyboard reports (USB HID Spec 1.11, Appendix B.1)
//! and the US-layout keycode-to-character table used for line reconstruction.

use bitflags::bitflags;

use super::constants::{BOOT_KEYBOARD_REPORT_SIZE, KEY_ERROR_UNDEFINED, KEY_NONE};
use crate::config::MAX_BOOT_KEYS;

/// HID keyboard report (boot protocol)
///
/// Standard 8-byte keyboard report format:
/// - Byte 0: Modifier keys (Ctrl, Alt, Shift, GUI)
/// - Byte 1: Reserved (OEM use)
/// - Bytes 2-7: Up to 6 simultaneous key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardReport {
    /// Modifier key states
    pub modifiers: KeyModifiers,
    /// Key slots as delivered, sentinels included
    keycodes: [u8; MAX_BOOT_KEYS],
}

impl KeyboardReport {
    /// Parse report from raw data
    ///
    /// Returns `None` for transfers shorter than 8 bytes. Trailing bytes
    /// beyond the boot layout are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::hid::{KeyCode, KeyboardReport};
    ///
    /// let report = KeyboardReport::parse(&[0x02, 0x00, 0x04, 0, 0, 0, 0, 0]).unwrap();
    /// assert!(report.modifiers.shift());
    /// assert!(report.contains(KeyCode::A));
    ///
    /// assert!(KeyboardReport::parse(&[0x00, 0x00, 0x04]).is_none());
    /// ```
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < BOOT_KEYBOARD_REPORT_SIZE {
            return None;
        }

        Some(Self {
            modifiers: KeyModifiers::from_bits_retain(data[0]),
            keycodes: [data[2], data[3], data[4], data[5], data[6], data[7]],
        })
    }

    /// Build a report from parts
    pub const fn new(modifiers: KeyModifiers, keycodes: [u8; MAX_BOOT_KEYS]) -> Self {
        Self { modifiers, keycodes }
    }

    /// Raw key slots, sentinels included
    pub fn slots(&self) -> &[u8; MAX_BOOT_KEYS] {
        &self.keycodes
    }

    /// Iterate over pressed keys in slot order, skipping no-key and error codes
    pub fn keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keycodes
            .iter()
            .map(|&code| KeyCode(code))
            .filter(|code| !code.is_sentinel())
    }

    /// Check if a key occupies any slot
    pub fn contains(&self, key: KeyCode) -> bool {
        self.keycodes.contains(&key.0)
    }

    /// Check if any non-sentinel key is pressed
    pub fn has_keys(&self) -> bool {
        self.keys().next().is_some()
    }

    /// Phantom state: ErrorRollOver in the first slot
    pub fn is_rollover(&self) -> bool {
        self.keycodes[0] == super::constants::KEY_ERROR_ROLLOVER
    }
}

bitflags! {
    /// Keyboard modifier keys
    ///
    /// Carried by the report as a whole, not by individual keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyModifiers: u8 {
        /// Left Control
        const LEFT_CTRL  = 0b00000001;
        /// Left Shift
        const LEFT_SHIFT = 0b00000010;
        /// Left Alt
        const LEFT_ALT   = 0b00000100;
        /// Left GUI (Windows/Command key)
        const LEFT_GUI   = 0b00001000;
        /// Right Control
        const RIGHT_CTRL  = 0b00010000;
        /// Right Shift
        const RIGHT_SHIFT = 0b00100000;
        /// Right Alt
        const RIGHT_ALT   = 0b01000000;
        /// Right GUI (Windows/Command key)
        const RIGHT_GUI   = 0b10000000;
    }
}

impl KeyModifiers {
    /// Check if any Ctrl key is pressed
    pub fn ctrl(&self) -> bool {
        self.intersects(Self::LEFT_CTRL | Self::RIGHT_CTRL)
    }

    /// Check if any Shift key is pressed
    pub fn shift(&self) -> bool {
        self.intersects(Self::LEFT_SHIFT | Self::RIGHT_SHIFT)
    }

    /// Check if any Alt key is pressed
    pub fn alt(&self) -> bool {
        self.intersects(Self::LEFT_ALT | Self::RIGHT_ALT)
    }

    /// Check if any GUI key is pressed
    pub fn gui(&self) -> bool {
        self.intersects(Self::LEFT_GUI | Self::RIGHT_GUI)
    }
}

/// Range a keycode falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyClass {
    /// 0x00, empty slot
    NoKey,
    /// 0x01..=0x03, rollover / POST fail / undefined
    Error,
    /// 0x04..=0x38, covered by the character table
    Printable,
    /// 0xE0..=0xE7, modifier usages
    Modifier,
    /// Everything else: function, navigation, keypad, media
    Other,
}

/// HID keyboard keycode
///
/// Standard USB HID keyboard scancodes (Usage Page 0x07).
/// See HID Usage Tables 1.12, Section 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyCode(pub u8);

impl KeyCode {
    // Letter keys (0x04-0x1D)
    pub const A: Self = Self(0x04);
    pub const B: Self = Self(0x05);
    pub const C: Self = Self(0x06);
    pub const D: Self = Self(0x07);
    pub const E: Self = Self(0x08);
    pub const F: Self = Self(0x09);
    pub const G: Self = Self(0x0A);
    pub const H: Self = Self(0x0B);
    pub const I: Self = Self(0x0C);
    pub const J: Self = Self(0x0D);
    pub const K: Self = Self(0x0E);
    pub const L: Self = Self(0x0F);
    pub const M: Self = Self(0x10);
    pub const N: Self = Self(0x11);
    pub const O: Self = Self(0x12);
    pub const P: Self = Self(0x13);
    pub const Q: Self = Self(0x14);
    pub const R: Self = Self(0x15);
    pub const S: Self = Self(0x16);
    pub const T: Self = Self(0x17);
    pub const U: Self = Self(0x18);
    pub const V: Self = Self(0x19);
    pub const W: Self = Self(0x1A);
    pub const X: Self = Self(0x1B);
    pub const Y: Self = Self(0x1C);
    pub const Z: Self = Self(0x1D);

    // Number keys (0x1E-0x27)
    pub const KEY_1: Self = Self(0x1E);
    pub const KEY_2: Self = Self(0x1F);
    pub const KEY_3: Self = Self(0x20);
    pub const KEY_4: Self = Self(0x21);
    pub const KEY_5: Self = Self(0x22);
    pub const KEY_6: Self = Self(0x23);
    pub const KEY_7: Self = Self(0x24);
    pub const KEY_8: Self = Self(0x25);
    pub const KEY_9: Self = Self(0x26);
    pub const KEY_0: Self = Self(0x27);

    // Special keys
    pub const ENTER: Self = Self(0x28);
    pub const ESCAPE: Self = Self(0x29);
    pub const BACKSPACE: Self = Self(0x2A);
    pub const TAB: Self = Self(0x2B);
    pub const SPACE: Self = Self(0x2C);
    pub const MINUS: Self = Self(0x2D);
    pub const EQUALS: Self = Self(0x2E);
    pub const LEFT_BRACKET: Self = Self(0x2F);
    pub const RIGHT_BRACKET: Self = Self(0x30);
    pub const BACKSLASH: Self = Self(0x31);
    pub const NON_US_HASH: Self = Self(0x32);
    pub const SEMICOLON: Self = Self(0x33);
    pub const APOSTROPHE: Self = Self(0x34);
    pub const GRAVE: Self = Self(0x35);
    pub const COMMA: Self = Self(0x36);
    pub const PERIOD: Self = Self(0x37);
    pub const SLASH: Self = Self(0x38);
    pub const CAPS_LOCK: Self = Self(0x39);

    // Function keys
    pub const F1: Self = Self(0x3A);
    pub const F12: Self = Self(0x45);

    // Navigation keys
    pub const RIGHT_ARROW: Self = Self(0x4F);
    pub const LEFT_ARROW: Self = Self(0x50);
    pub const DOWN_ARROW: Self = Self(0x51);
    pub const UP_ARROW: Self = Self(0x52);

    // Modifier usages
    pub const LEFT_CTRL: Self = Self(0xE0);
    pub const RIGHT_GUI: Self = Self(0xE7);

    /// Classify the keycode by range
    pub const fn class(&self) -> KeyClass {
        match self.0 {
            KEY_NONE => KeyClass::NoKey,
            0x01..=KEY_ERROR_UNDEFINED => KeyClass::Error,
            0x04..=0x38 => KeyClass::Printable,
            0xE0..=0xE7 => KeyClass::Modifier,
            _ => KeyClass::Other,
        }
    }

    /// No-key or error code; never part of the key state
    pub const fn is_sentinel(&self) -> bool {
        self.0 <= KEY_ERROR_UNDEFINED
    }

    /// Resolve the character for this key
    ///
    /// Only the printable range is looked up; everything else (and table
    /// entries without a character, such as Escape or Tab) yields `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::hid::KeyCode;
    ///
    /// assert_eq!(KeyCode::A.to_char(false), Some('a'));
    /// assert_eq!(KeyCode::KEY_1.to_char(true), Some('!'));
    /// assert_eq!(KeyCode::ENTER.to_char(false), Some('\r'));
    /// assert_eq!(KeyCode::F1.to_char(false), None);
    /// ```
    pub fn to_char(&self, shift: bool) -> Option<char> {
        if self.class() != KeyClass::Printable {
            return None;
        }
        let entry = KEYCODE_TO_ASCII.get(self.0 as usize)?;
        match entry[shift as usize] {
            0 => None,
            byte => Some(byte as char),
        }
    }

    /// Get raw keycode value
    pub const fn raw(&self) -> u8 {
        self.0
    }
}

/// US layout, indexed by keycode: `[unshifted, shifted]`, 0 = no character
static KEYCODE_TO_ASCII: [[u8; 2]; 0x39] = [
    [0, 0], [0, 0], [0, 0], [0, 0],
    [b'a', b'A'], [b'b', b'B'], [b'c', b'C'], [b'd', b'D'], [b'e', b'E'],
    [b'f', b'F'], [b'g', b'G'], [b'h', b'H'], [b'i', b'I'], [b'j', b'J'],
    [b'k', b'K'], [b'l', b'L'], [b'm', b'M'], [b'n', b'N'], [b'o', b'O'],
    [b'p', b'P'], [b'q', b'Q'], [b'r', b'R'], [b's', b'S'], [b't', b'T'],
    [b'u', b'U'], [b'v', b'V'], [b'w', b'W'], [b'x', b'X'], [b'y', b'Y'],
    [b'z', b'Z'],
    [b'1', b'!'], [b'2', b'@'], [b'3', b'#'], [b'4', b'$'], [b'5', b'%'],
    [b'6', b'^'], [b'7', b'&'], [b'8', b'*'], [b'9', b'('], [b'0', b')'],
    [b'\r', b'\r'], // Enter
    [0, 0],         // Escape
    [0x08, 0],      // Backspace
    [0, 0],         // Tab
    [b' ', b' '],
    [b'-', b'_'], [b'=', b'+'], [b'[', b'{'], [b']', b'}'],
    [b'\\', b'|'],
    [b'\\', b'|'],  // Non-US # and ~
    [b';', b':'], [b'\'', b'"'], [b'`', b'~'],
    [b',', b'<'], [b'.', b'>'], [b'/', b'?'],
];
