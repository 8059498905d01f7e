//! Application wiring
//!
//! Two halves run on different threads of execution:
//!
//! - [`ReportPipeline`] runs on the USB driver's callback thread. It decodes
//!   each input report, diffs key state, accumulates lines and sends them.
//!   It never touches the event queue except to forward interface
//!   disconnect/error notifications.
//! - [`EventLoop`] is the single consumer of the [`EventQueue`]. It owns the
//!   device table and every lifecycle transition.
//!
//! The trigger interrupt and the driver's lifecycle callback feed the queue
//! through [`signal_trigger`] and [`forward_driver_event`].

use core::fmt;

use crate::config::{AppConfig, EVENT_QUEUE_DEPTH, LINE_BUFFER_SIZE, MAX_TRACKED_DEVICES, RAW_REPORT_SIZE};
use crate::device::{configure_device, DeviceParams, HidHost};
use crate::error::{ConfigStep, HidError, Result};
use crate::events::{AppEvent, EventQueue, InterfaceEvent, LifecycleEvent};
use crate::hid::generic::HexDump;
use crate::hid::mouse::{MouseRecord, MouseTracker};
use crate::hid::report::{Report, ReportKind};
use crate::hid::tracker::KeyStateTracker;
use crate::lifecycle::{DeviceState, DeviceTable};
use crate::line::{LineAccumulator, LineOutcome};
use crate::stats::{PipelineStats, StatsSnapshot};
use crate::transport::Transport;

/// Human-facing output of the report path
pub trait Console {
    /// Report stream switched to a different kind
    fn header(&mut self, kind: ReportKind);
    /// Typed text
    fn echo(&mut self, text: &str);
    /// Mouse position and buttons
    fn mouse(&mut self, record: &MouseRecord);
    /// Uninterpreted report
    fn generic(&mut self, dump: &HexDump);
}

/// [`Console`] writing through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConsole;

impl Console for LogConsole {
    fn header(&mut self, kind: ReportKind) {
        log::info!("{}", kind.title());
    }

    fn echo(&mut self, text: &str) {
        log::debug!("{}", text);
    }

    fn mouse(&mut self, record: &MouseRecord) {
        log::info!("{}", record);
    }

    fn generic(&mut self, dump: &HexDump) {
        log::info!("{}", dump);
    }
}

/// What one input report produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Report rejected before any state changed
    Dropped(HidError),
    /// Keyboard report
    Keyboard {
        /// Press and release events derived from the report
        events: usize,
        /// Lines successfully handed to the transport
        lines_sent: usize,
    },
    /// Mouse report
    Mouse(MouseRecord),
    /// Generic report
    Generic {
        /// Bytes rendered
        len: usize,
        /// Report was longer than the dump limit
        truncated: bool,
    },
}

/// Per-report processing state, owned by the driver callback context
///
/// Key state and the partial line belong to one keyboard at a time: the
/// handle whose report last reached the key tracker. Input from another
/// keyboard, or that keyboard going away, starts both over.
///
/// # Example
///
/// ```
/// use hidline::app::{LogConsole, ReportOutcome, ReportPipeline};
/// use hidline::config::AppConfig;
/// use hidline::device::DeviceParams;
/// use hidline::transport::NullTransport;
///
/// let mut pipeline: ReportPipeline<u8> = ReportPipeline::new(AppConfig::new());
/// let outcome = pipeline.handle_report(
///     1,
///     &[0, 0, 0x04, 0, 0, 0, 0, 0],
///     DeviceParams::BOOT_KEYBOARD,
///     &mut NullTransport,
///     &mut LogConsole,
/// );
/// assert_eq!(outcome, ReportOutcome::Keyboard { events: 1, lines_sent: 0 });
/// ```
pub struct ReportPipeline<H, const C: usize = LINE_BUFFER_SIZE> {
    config: AppConfig,
    /// Keyboard feeding `keys` and `line`
    keyboard: Option<H>,
    keys: KeyStateTracker,
    line: LineAccumulator<C>,
    mouse: MouseTracker,
    last_kind: Option<ReportKind>,
    stats: PipelineStats,
}

impl<H: Copy + Eq + fmt::Debug, const C: usize> ReportPipeline<H, C> {
    /// Fresh pipeline
    pub const fn new(config: AppConfig) -> Self {
        Self {
            config,
            keyboard: None,
            keys: KeyStateTracker::new(),
            line: LineAccumulator::with_terminator(config.terminator),
            mouse: MouseTracker::new(),
            last_kind: None,
            stats: PipelineStats::new(),
        }
    }

    /// Settings in use
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Keyboard whose key state and line are being tracked
    pub fn keyboard(&self) -> Option<H> {
        self.keyboard
    }

    /// Key-state tracker
    pub fn keys(&self) -> &KeyStateTracker {
        &self.keys
    }

    /// Line accumulator
    pub fn line(&self) -> &LineAccumulator<C> {
        &self.line
    }

    /// Counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Process one raw input report from `handle`
    ///
    /// Malformed reports are dropped with a trace line and leave every
    /// piece of state untouched.
    pub fn handle_report<T, K>(
        &mut self,
        handle: H,
        data: &[u8],
        params: DeviceParams,
        transport: &mut T,
        console: &mut K,
    ) -> ReportOutcome
    where
        T: Transport,
        K: Console,
    {
        let report = match Report::decode(data, params, self.config.generic_dump_limit) {
            Ok(report) => report,
            Err(e) => {
                log::trace!("Dropping report: {}", e);
                PipelineStats::bump(&self.stats.reports_dropped);
                return ReportOutcome::Dropped(e);
            }
        };
        PipelineStats::bump(&self.stats.reports_decoded);

        let kind = report.kind();
        if self.last_kind != Some(kind) {
            console.header(kind);
            self.last_kind = Some(kind);
        }

        match report {
            Report::Keyboard(report) => {
                if self.keyboard != Some(handle) {
                    if let Some(previous) = self.keyboard {
                        log::debug!("Keyboard input moved from {:?} to {:?}", previous, handle);
                    }
                    self.forget_keyboard();
                    self.keyboard = Some(handle);
                }

                let events = self.keys.update(&report);
                let mut lines_sent = 0;

                for event in events.iter() {
                    if event.is_press() {
                        PipelineStats::bump(&self.stats.key_presses);
                    }

                    let outcome = self.line.handle(event, transport);
                    match outcome {
                        LineOutcome::Completed(Ok(_)) => {
                            PipelineStats::bump(&self.stats.lines_sent);
                            lines_sent += 1;
                        }
                        LineOutcome::Completed(Err(_)) => {
                            PipelineStats::bump(&self.stats.send_failures);
                        }
                        LineOutcome::Overflow(_) => {
                            PipelineStats::bump(&self.stats.chars_dropped);
                        }
                        _ => {}
                    }

                    if self.config.echo {
                        self.echo(outcome, console);
                    }
                }

                ReportOutcome::Keyboard {
                    events: events.len(),
                    lines_sent,
                }
            }
            Report::Mouse(report) => {
                let record = self.mouse.apply(&report);
                console.mouse(&record);
                ReportOutcome::Mouse(record)
            }
            Report::Generic(dump) => {
                console.generic(&dump);
                ReportOutcome::Generic {
                    len: dump.len,
                    truncated: dump.truncated,
                }
            }
        }
    }

    fn forget_keyboard(&mut self) {
        self.keyboard = None;
        self.keys.reset();
        self.line.reset();
    }

    fn echo<K: Console>(&self, outcome: LineOutcome, console: &mut K) {
        let Some(ch) = outcome.echo(self.config.terminator) else {
            return;
        };

        if ch as u32 == self.config.terminator as u32 {
            console.echo("\r\n");
        } else {
            let mut utf8 = [0u8; 4];
            console.echo(ch.encode_utf8(&mut utf8));
        }
    }

    /// Handle an interface event on the driver callback thread
    ///
    /// `InputReport` reads the raw report and processes it in place.
    /// `Disconnected` and `TransferError` are forwarded to the consumer
    /// through `queue`; a full queue drops them.
    ///
    /// # Errors
    ///
    /// Propagates failures reading the device parameters or the report.
    pub fn on_interface_event<D, T, K, const N: usize>(
        &mut self,
        host: &mut D,
        queue: &EventQueue<AppEvent<H>, N>,
        handle: H,
        event: InterfaceEvent,
        transport: &mut T,
        console: &mut K,
    ) -> Result<Option<ReportOutcome>>
    where
        D: HidHost<Handle = H>,
        T: Transport,
        K: Console,
    {
        match event.lifecycle() {
            None => {
                let params = host.device_params(handle)?;
                let mut raw = [0u8; RAW_REPORT_SIZE];
                let len = host.read_input_report(handle, &mut raw)?.min(RAW_REPORT_SIZE);
                Ok(Some(self.handle_report(handle, &raw[..len], params, transport, console)))
            }
            Some(lifecycle) => {
                if lifecycle == LifecycleEvent::TransferError {
                    log::warn!("Transfer error on {:?}", handle);
                }
                if self.keyboard == Some(handle) {
                    self.forget_keyboard();
                }
                let _ = forward_driver_event(queue, handle, lifecycle, 0);
                Ok(None)
            }
        }
    }
}

/// Enqueue a trigger press; safe from interrupt context
pub fn signal_trigger<H, const N: usize>(queue: &EventQueue<AppEvent<H>, N>) -> Result<()> {
    queue.try_send(AppEvent::ExternalTrigger)
}

/// Enqueue a driver lifecycle notification without waiting
pub fn forward_driver_event<H, const N: usize>(
    queue: &EventQueue<AppEvent<H>, N>,
    handle: H,
    event: LifecycleEvent,
    arg: usize,
) -> Result<()> {
    queue.try_send(AppEvent::DeviceLifecycle { handle, event, arg })
}

/// Whether the consumer loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// Wait for the next event
    Continue,
    /// Leave the loop
    Shutdown,
}

/// Summary handed back when the consumer loop exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShutdownReport {
    /// Events taken off the queue
    pub events_processed: u32,
    /// Devices that connected during the run
    pub devices_seen: u32,
    /// Events still pending at shutdown, discarded
    pub events_discarded: usize,
    /// Events the producers lost to a full queue
    pub events_dropped: u32,
}

/// Single consumer of the event queue
pub struct EventLoop<
    'q,
    H: HidHost,
    const N: usize = EVENT_QUEUE_DEPTH,
    const D: usize = MAX_TRACKED_DEVICES,
> {
    host: H,
    queue: &'q EventQueue<AppEvent<H::Handle>, N>,
    devices: DeviceTable<H::Handle, D>,
    config: AppConfig,
    processed: u32,
}

impl<'q, H: HidHost, const N: usize, const D: usize> EventLoop<'q, H, N, D> {
    /// Consumer over `queue`, driving `host`
    pub fn new(host: H, queue: &'q EventQueue<AppEvent<H::Handle>, N>, config: AppConfig) -> Self {
        Self {
            host,
            queue,
            devices: DeviceTable::new(),
            config,
            processed: 0,
        }
    }

    /// Device collaborator
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Device collaborator, mutable
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Device table
    pub fn devices(&self) -> &DeviceTable<H::Handle, D> {
        &self.devices
    }

    /// Lifecycle state of one device
    pub fn state(&self, handle: H::Handle) -> DeviceState {
        self.devices.state(handle)
    }

    /// Handle one dequeued event
    ///
    /// # Errors
    ///
    /// Any error here concerns a single device (or the device count query);
    /// [`run`](Self::run) logs it and keeps looping.
    pub fn step(&mut self, event: AppEvent<H::Handle>) -> Result<Control> {
        self.processed = self.processed.wrapping_add(1);

        match event {
            AppEvent::ExternalTrigger => {
                if self.host.device_count()? == 0 {
                    log::info!("No USB devices attached, shutting down");
                    Ok(Control::Shutdown)
                } else {
                    log::warn!("Remove USB devices and press button again");
                    Ok(Control::Continue)
                }
            }
            AppEvent::DeviceLifecycle { handle, event, arg } => {
                log::trace!("Lifecycle {:?} for {:?} (arg {})", event, handle, arg);
                self.on_lifecycle(handle, event)?;
                Ok(Control::Continue)
            }
        }
    }

    fn on_lifecycle(&mut self, handle: H::Handle, event: LifecycleEvent) -> Result<()> {
        match event {
            LifecycleEvent::Connected => {
                self.devices.transition(handle, event)?;
                log::info!("Device {:?} connected", handle);

                match self.bring_up(handle) {
                    Ok(()) => self.devices.mark_streaming(handle),
                    Err(e) => {
                        log::error!("Device {:?}: {}", handle, e);
                        self.devices.abort(handle)?;
                        let _ = self.host.close(handle);
                        Err(e)
                    }
                }
            }
            LifecycleEvent::Disconnected | LifecycleEvent::TransferError => {
                self.devices.transition(handle, event)?;
                log::info!("Device {:?} closed ({:?})", handle, event);
                self.host.close(handle)
            }
        }
    }

    fn bring_up(&mut self, handle: H::Handle) -> Result<()> {
        let params = self
            .host
            .device_params(handle)
            .map_err(|_| HidError::ConfigurationFailed(ConfigStep::Parameters))?;
        log::info!(
            "Device {:?}: protocol {}, boot {}",
            handle,
            params.protocol.name(),
            params.is_boot()
        );
        configure_device(&mut self.host, handle, params, &self.config)
    }

    /// Consume events until a trigger arrives with no devices attached
    ///
    /// `idle` runs whenever the queue is empty. Per-event errors are logged
    /// and never end the loop. On exit the queue is reset.
    pub fn run<F: FnMut()>(&mut self, mut idle: F) -> ShutdownReport {
        loop {
            let event = self.queue.recv(&mut idle);
            match self.step(event) {
                Ok(Control::Continue) => {}
                Ok(Control::Shutdown) => break,
                Err(e) => log::error!("Event handling failed: {}", e),
            }
        }

        let events_discarded = self.queue.reset();
        ShutdownReport {
            events_processed: self.processed,
            devices_seen: self.devices.seen(),
            events_discarded,
            events_dropped: self.queue.dropped(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NullTransport;

    #[derive(Default)]
    struct Screen {
        headers: std::vec::Vec<ReportKind>,
        text: std::string::String,
    }

    impl Console for Screen {
        fn header(&mut self, kind: ReportKind) {
            self.headers.push(kind);
        }

        fn echo(&mut self, text: &str) {
            self.text.push_str(text);
        }

        fn mouse(&mut self, _record: &MouseRecord) {}

        fn generic(&mut self, _dump: &HexDump) {}
    }

    #[test]
    fn test_header_only_on_kind_change() {
        let mut pipeline: ReportPipeline<u8> = ReportPipeline::new(AppConfig::new());
        let mut screen = Screen::default();
        let mut transport = NullTransport;

        let reports: [&[u8]; 4] = [&[0, 1, 1], &[0, 2, 2], &[0; 8], &[0, 1, 0]];
        for data in reports {
            let params = if data.len() == 8 {
                DeviceParams::BOOT_KEYBOARD
            } else {
                DeviceParams::BOOT_MOUSE
            };
            pipeline.handle_report(1, data, params, &mut transport, &mut screen);
        }

        assert_eq!(
            screen.headers,
            [ReportKind::Mouse, ReportKind::Keyboard, ReportKind::Mouse]
        );
    }

    #[test]
    fn test_echo_terminator_as_crlf() {
        let mut pipeline: ReportPipeline<u8> = ReportPipeline::new(AppConfig::new());
        let mut screen = Screen::default();
        let mut transport = NullTransport;

        for keys in [[0x04u8, 0, 0, 0, 0, 0], [0; 6], [0x28, 0, 0, 0, 0, 0]] {
            let mut data = [0u8; 8];
            data[2..].copy_from_slice(&keys);
            pipeline.handle_report(1, &data, DeviceParams::BOOT_KEYBOARD, &mut transport, &mut screen);
        }

        assert_eq!(screen.text, "a\r\n");
        assert_eq!(pipeline.stats().send_failures, 1);
    }

    #[test]
    fn test_echo_disabled() {
        let mut pipeline: ReportPipeline<u8> = ReportPipeline::new(AppConfig::new().echo(false));
        let mut screen = Screen::default();
        pipeline.handle_report(
            1,
            &[0, 0, 0x04, 0, 0, 0, 0, 0],
            DeviceParams::BOOT_KEYBOARD,
            &mut NullTransport,
            &mut screen,
        );
        assert!(screen.text.is_empty());
        assert_eq!(pipeline.line().buffer().as_bytes(), b"a");
    }

    #[test]
    fn test_malformed_report_counted() {
        let mut pipeline: ReportPipeline<u8> = ReportPipeline::new(AppConfig::new());
        let outcome = pipeline.handle_report(
            1,
            &[0, 0, 0x04],
            DeviceParams::BOOT_KEYBOARD,
            &mut NullTransport,
            &mut LogConsole,
        );
        assert!(matches!(outcome, ReportOutcome::Dropped(HidError::ShortReport { .. })));
        assert_eq!(pipeline.stats().reports_dropped, 1);
        assert!(pipeline.keys().pressed().is_empty());
        assert_eq!(pipeline.keyboard(), None);
    }

    #[test]
    fn test_second_keyboard_starts_over() {
        let mut pipeline: ReportPipeline<u8> = ReportPipeline::new(AppConfig::new());
        let mut screen = Screen::default();

        pipeline.handle_report(1, &[0, 0, 0x04, 0, 0, 0, 0, 0], DeviceParams::BOOT_KEYBOARD, &mut NullTransport, &mut screen);
        pipeline.handle_report(2, &[0, 0, 0x05, 0, 0, 0, 0, 0], DeviceParams::BOOT_KEYBOARD, &mut NullTransport, &mut screen);

        assert_eq!(pipeline.keyboard(), Some(2));
        assert_eq!(pipeline.keys().pressed(), &[crate::hid::KeyCode::B]);
        assert_eq!(pipeline.line().buffer().as_bytes(), b"b");
    }
}
