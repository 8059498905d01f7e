//! Mock collaborators for testing without a USB host stack
//!
//! [`MockHost`] records every call and can be told to fail one step of the
//! configuration sequence.

use std::collections::VecDeque;

use hidline::app::Console;
use hidline::device::{DeviceParams, HidHost};
use hidline::error::{ConfigStep, HidError, Result};
use hidline::hid::constants::HidRequest;
use hidline::hid::{HexDump, MouseRecord, ReportKind};
use hidline::transport::Transport;

/// Call made into the mock host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Open(u8),
    ClassRequest(u8, HidRequest, u16),
    Start(u8),
    Close(u8),
}

/// In-memory USB host stack
#[derive(Debug, Default)]
pub struct MockHost {
    devices: Vec<(u8, DeviceParams)>,
    reports: VecDeque<Vec<u8>>,
    /// Configuration step that fails for every device
    pub fail_at: Option<ConfigStep>,
    /// Devices physically attached, as reported by `device_count`
    pub attached: usize,
    /// Calls in order
    pub calls: Vec<HostCall>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and count it as attached
    pub fn attach(&mut self, handle: u8, params: DeviceParams) {
        self.devices.push((handle, params));
        self.attached += 1;
    }

    /// Physically remove a device
    pub fn detach(&mut self, handle: u8) {
        self.devices.retain(|(h, _)| *h != handle);
        self.attached = self.attached.saturating_sub(1);
    }

    /// Queue a raw report for the next `read_input_report`
    pub fn push_report(&mut self, report: &[u8]) {
        self.reports.push_back(report.to_vec());
    }

    fn check(&self, step: ConfigStep) -> Result<()> {
        if self.fail_at == Some(step) {
            Err(HidError::DeviceError)
        } else {
            Ok(())
        }
    }
}

impl HidHost for MockHost {
    type Handle = u8;

    fn device_params(&mut self, handle: u8) -> Result<DeviceParams> {
        self.check(ConfigStep::Parameters)?;
        self.devices
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, p)| *p)
            .ok_or(HidError::UnknownDevice)
    }

    fn read_input_report(&mut self, _handle: u8, buf: &mut [u8]) -> Result<usize> {
        let report = self.reports.pop_front().ok_or(HidError::DeviceError)?;
        let len = report.len().min(buf.len());
        buf[..len].copy_from_slice(&report[..len]);
        Ok(len)
    }

    fn open(&mut self, handle: u8) -> Result<()> {
        self.check(ConfigStep::Open)?;
        self.calls.push(HostCall::Open(handle));
        Ok(())
    }

    fn class_request(&mut self, handle: u8, request: HidRequest, value: u16) -> Result<()> {
        let step = match request {
            HidRequest::SetIdle => ConfigStep::SetIdle,
            _ => ConfigStep::SetProtocol,
        };
        self.check(step)?;
        self.calls.push(HostCall::ClassRequest(handle, request, value));
        Ok(())
    }

    fn start(&mut self, handle: u8) -> Result<()> {
        self.check(ConfigStep::Start)?;
        self.calls.push(HostCall::Start(handle));
        Ok(())
    }

    fn close(&mut self, handle: u8) -> Result<()> {
        self.calls.push(HostCall::Close(handle));
        Ok(())
    }

    fn device_count(&mut self) -> Result<usize> {
        Ok(self.attached)
    }
}

/// Transport that keeps every payload
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<Vec<u8>>,
    /// Fail every send after recording it
    pub fail: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads as text
    pub fn lines(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, payload: &[u8]) -> Result<usize> {
        self.sent.push(payload.to_vec());
        if self.fail {
            Err(HidError::TransportFailed)
        } else {
            Ok(payload.len())
        }
    }
}

/// Console that keeps everything it is shown
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub headers: Vec<ReportKind>,
    pub echoed: String,
    pub mouse: Vec<MouseRecord>,
    pub generic: Vec<String>,
}

impl Console for RecordingConsole {
    fn header(&mut self, kind: ReportKind) {
        self.headers.push(kind);
    }

    fn echo(&mut self, text: &str) {
        self.echoed.push_str(text);
    }

    fn mouse(&mut self, record: &MouseRecord) {
        self.mouse.push(*record);
    }

    fn generic(&mut self, dump: &HexDump) {
        self.generic.push(dump.to_string());
    }
}
