//! Line reconstruction from key presses
//!
//! Keyboard-emulating readers (RFID, barcode) "type" a tag followed by
//! Enter. [`LineAccumulator`] collects the typed characters and hands each
//! completed line to the [`Transport`].

use heapless::Vec;

use crate::config::{DEFAULT_TERMINATOR, LINE_BUFFER_SIZE};
use crate::error::{HidError, Result};
use crate::hid::tracker::KeyEvent;
use crate::transport::Transport;

/// Bounded line storage
///
/// Holds at most `C - 1` bytes; the last slot stays reserved for the
/// terminator.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const C: usize = LINE_BUFFER_SIZE> {
    bytes: Vec<u8, C>,
}

impl<const C: usize> LineBuffer<C> {
    /// Empty buffer
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Usable capacity
    pub const fn capacity(&self) -> usize {
        C.saturating_sub(1)
    }

    /// Append a byte
    ///
    /// # Errors
    ///
    /// [`HidError::BufferFull`] once `capacity()` bytes are stored; the
    /// buffer is left unchanged.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        if self.bytes.len() >= self.capacity() {
            return Err(HidError::BufferFull);
        }
        self.bytes.push(byte).map_err(|_| HidError::BufferFull)
    }

    /// Stored bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Stored bytes as text, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Number of stored bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop all stored bytes
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// What a single key event did to the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Release, or a key without a character
    Ignored,
    /// Character stored
    Appended(char),
    /// Buffer full, character dropped
    Overflow(char),
    /// Terminator on an empty line, nothing sent
    EmptyLine,
    /// Line handed to the transport; holds the send result
    Completed(Result<usize>),
}

impl LineOutcome {
    /// Character to echo for this outcome, if any
    pub fn echo(&self, terminator: u8) -> Option<char> {
        match self {
            Self::Appended(ch) | Self::Overflow(ch) => Some(*ch),
            Self::EmptyLine | Self::Completed(_) => Some(terminator as char),
            Self::Ignored => None,
        }
    }
}

/// Turns press events into completed lines
#[derive(Debug, Clone)]
pub struct LineAccumulator<const C: usize = LINE_BUFFER_SIZE> {
    buffer: LineBuffer<C>,
    terminator: u8,
}

impl<const C: usize> LineAccumulator<C> {
    /// Accumulator ending lines on carriage return
    pub const fn new() -> Self {
        Self::with_terminator(DEFAULT_TERMINATOR)
    }

    /// Accumulator ending lines on `terminator`
    pub const fn with_terminator(terminator: u8) -> Self {
        Self {
            buffer: LineBuffer::new(),
            terminator,
        }
    }

    /// Line collected so far
    pub fn buffer(&self) -> &LineBuffer<C> {
        &self.buffer
    }

    /// Feed one key event
    ///
    /// Only presses are considered. The character is resolved with the
    /// event's shift state; on the terminator a non-empty line is sent and
    /// the buffer cleared whether or not the send succeeded.
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::hid::{KeyCode, KeyEvent, KeyModifiers};
    /// use hidline::line::{LineAccumulator, LineOutcome};
    /// use hidline::transport::NullTransport;
    ///
    /// let mut line: LineAccumulator = LineAccumulator::new();
    /// let press = KeyEvent::pressed(KeyCode::A, KeyModifiers::LEFT_SHIFT);
    /// assert_eq!(line.handle(&press, &mut NullTransport), LineOutcome::Appended('A'));
    /// ```
    pub fn handle<T: Transport>(&mut self, event: &KeyEvent, transport: &mut T) -> LineOutcome {
        if !event.is_press() {
            return LineOutcome::Ignored;
        }

        let ch = match event.code.to_char(event.modifiers.shift()) {
            Some(ch) => ch,
            None => return LineOutcome::Ignored,
        };

        if ch as u32 == self.terminator as u32 {
            return self.complete(transport);
        }

        match self.buffer.push(ch as u8) {
            Ok(()) => LineOutcome::Appended(ch),
            Err(_) => {
                log::warn!("Line buffer full, discarding {:?}", ch);
                LineOutcome::Overflow(ch)
            }
        }
    }

    fn complete<T: Transport>(&mut self, transport: &mut T) -> LineOutcome {
        if self.buffer.is_empty() {
            return LineOutcome::EmptyLine;
        }

        match self.buffer.as_str() {
            Some(text) => log::info!("Sending line: {}", text),
            None => log::info!("Sending line: {:02X?}", self.buffer.as_bytes()),
        }

        let sent = transport.send(self.buffer.as_bytes());
        match sent {
            Ok(bytes) => log::info!("Sent {} bytes", bytes),
            Err(e) => log::error!("Line send failed: {}", e),
        }

        self.buffer.clear();
        LineOutcome::Completed(sent)
    }

    /// Discard a partially typed line
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl<const C: usize> Default for LineAccumulator<C> {
    fn default() -> Self {
        Self::new()
    }
}
