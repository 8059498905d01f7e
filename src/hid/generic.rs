//! Fallback for HID devices that do not speak the boot protocol
//!
//! Reports are surfaced verbatim as upper-case hex, bounded to
//! [`GENERIC_DUMP_LIMIT`] bytes.

use core::fmt;

use heapless::String;

use crate::config::GENERIC_DUMP_LIMIT;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Hex rendering of an uninterpreted report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexDump {
    text: String<{ 2 * GENERIC_DUMP_LIMIT }>,
    /// Bytes in the original report
    pub len: usize,
    /// Report was longer than the dump limit
    pub truncated: bool,
}

impl HexDump {
    /// Encode up to `limit` bytes (never more than [`GENERIC_DUMP_LIMIT`])
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::hid::HexDump;
    ///
    /// let dump = HexDump::encode(&[0x01, 0xAB, 0x7F], 64);
    /// assert_eq!(dump.as_str(), "01AB7F");
    /// assert!(!dump.truncated);
    /// ```
    pub fn encode(data: &[u8], limit: usize) -> Self {
        let limit = limit.min(GENERIC_DUMP_LIMIT);
        let mut text = String::new();
        let mut truncated = data.len() > limit;

        for &byte in data.iter().take(limit) {
            let hi = HEX_DIGITS[(byte >> 4) as usize] as char;
            let lo = HEX_DIGITS[(byte & 0x0F) as usize] as char;
            if text.push(hi).is_err() || text.push(lo).is_err() {
                truncated = true;
                break;
            }
        }

        Self {
            text,
            len: data.len(),
            truncated,
        }
    }

    /// Hex text
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

impl fmt::Display for HexDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())?;
        if self.truncated {
            f.write_str("..")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let dump = HexDump::encode(&[], GENERIC_DUMP_LIMIT);
        assert_eq!(dump.as_str(), "");
        assert_eq!(dump.len, 0);
    }

    #[test]
    fn test_oversized_report_truncated() {
        let data = [0xEEu8; 200];
        let dump = HexDump::encode(&data, 500);
        assert_eq!(dump.as_str().len(), 2 * GENERIC_DUMP_LIMIT);
        assert_eq!(dump.len, 200);
        assert!(dump.truncated);
    }

    #[test]
    fn test_custom_limit() {
        let dump = HexDump::encode(&[0x00, 0x10, 0x20, 0x30], 2);
        assert_eq!(dump.as_str(), "0010");
        assert!(dump.truncated);
    }
}
