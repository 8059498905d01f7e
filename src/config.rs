//! Compile-time capacities and runtime application settings

/// Depth of the cross-context event queue
pub const EVENT_QUEUE_DEPTH: usize = 10;

/// Line buffer capacity, one byte reserved for the terminator
pub const LINE_BUFFER_SIZE: usize = 64;

/// Simultaneous key slots in a boot keyboard report
pub const MAX_BOOT_KEYS: usize = 6;

/// Devices tracked at once by the lifecycle table
pub const MAX_TRACKED_DEVICES: usize = 4;

/// Largest generic report rendered as hex
pub const GENERIC_DUMP_LIMIT: usize = 64;

/// Size of the buffer raw input reports are read into
pub const RAW_REPORT_SIZE: usize = 64;

/// Carriage return, sent by keyboard-emulating readers at end of line
pub const DEFAULT_TERMINATOR: u8 = b'\r';

/// Runtime settings for the report pipeline and the event loop
///
/// # Example
///
/// ```
/// use hidline::config::AppConfig;
///
/// let config = AppConfig::new()
///     .echo(false)
///     .generic_dump_limit(16);
/// assert_eq!(config.terminator, b'\r');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Character that completes a line
    pub terminator: u8,
    /// Echo typed characters to the console
    pub echo: bool,
    /// Bytes of a generic report rendered as hex
    pub generic_dump_limit: usize,
    /// Send SET_IDLE(0) to boot keyboards during configuration
    pub set_idle_for_keyboards: bool,
}

impl AppConfig {
    /// Default settings
    pub const fn new() -> Self {
        Self {
            terminator: DEFAULT_TERMINATOR,
            echo: true,
            generic_dump_limit: GENERIC_DUMP_LIMIT,
            set_idle_for_keyboards: true,
        }
    }

    /// Set the line terminator
    pub const fn terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Enable or disable console echo
    pub const fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Limit generic hex dumps, clamped to [`GENERIC_DUMP_LIMIT`]
    pub const fn generic_dump_limit(mut self, limit: usize) -> Self {
        self.generic_dump_limit = if limit > GENERIC_DUMP_LIMIT {
            GENERIC_DUMP_LIMIT
        } else {
            limit
        };
        self
    }

    /// Enable or disable SET_IDLE for keyboards
    pub const fn set_idle_for_keyboards(mut self, enabled: bool) -> Self {
        self.set_idle_for_keyboards = enabled;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
