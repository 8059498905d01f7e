//! Transport collaborator
//!
//! Completed lines leave the device through a [`Transport`]. Delivery is
//! fire-and-forget: no acknowledgement, no retry, failures are only logged
//! by the caller.

use crate::error::{HidError, Result};

/// Outbound datagram sink for completed lines
pub trait Transport {
    /// Send one payload, returning the number of bytes handed off
    fn send(&mut self, payload: &[u8]) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, payload: &[u8]) -> Result<usize> {
        (**self).send(payload)
    }
}

/// Transport with no endpoint; every send fails with [`HidError::NotConnected`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _payload: &[u8]) -> Result<usize> {
        Err(HidError::NotConnected)
    }
}

/// UDP datagram transport to a fixed peer
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct UdpTransport {
    socket: std::net::UdpSocket,
}

#[cfg(feature = "std")]
impl UdpTransport {
    /// Bind an ephemeral local port and connect it to `peer`
    pub fn connect<A: std::net::ToSocketAddrs>(peer: A) -> std::io::Result<Self> {
        let socket = std::net::UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(peer)?;
        log::info!("UDP transport connected to {}", socket.peer_addr()?);
        Ok(Self { socket })
    }

    /// Wrap an already connected socket
    pub fn from_socket(socket: std::net::UdpSocket) -> Self {
        Self { socket }
    }

    /// Underlying socket, e.g. to receive [`ReplyCommand`]s
    pub fn socket(&self) -> &std::net::UdpSocket {
        &self.socket
    }
}

#[cfg(feature = "std")]
impl Transport for UdpTransport {
    fn send(&mut self, payload: &[u8]) -> Result<usize> {
        // Reported once, by the caller that owns the line
        self.socket.send(payload).map_err(|_| HidError::TransportFailed)
    }
}

/// Reply datagram from the line receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyCommand {
    /// Light the acknowledgement indicator
    IndicatorOn,
    /// Anything else
    Unknown,
}

impl ReplyCommand {
    /// Literal the receiver sends after accepting a line
    pub const INDICATOR_ON: &'static [u8] = b"LED_GREEN_ON";

    /// Classify a received datagram; trailing NUL and line endings are ignored
    ///
    /// # Example
    ///
    /// ```
    /// use hidline::transport::ReplyCommand;
    ///
    /// assert_eq!(ReplyCommand::parse(b"LED_GREEN_ON"), ReplyCommand::IndicatorOn);
    /// assert_eq!(ReplyCommand::parse(b"LED_RED_ON"), ReplyCommand::Unknown);
    /// ```
    pub fn parse(datagram: &[u8]) -> Self {
        let end = datagram
            .iter()
            .rposition(|&b| !matches!(b, 0 | b'\r' | b'\n'))
            .map_or(0, |i| i + 1);

        if &datagram[..end] == Self::INDICATOR_ON {
            Self::IndicatorOn
        } else {
            Self::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_transport_fails() {
        let mut transport = NullTransport;
        assert_eq!(transport.send(b"tag"), Err(HidError::NotConnected));
    }

    #[test]
    fn test_reply_trailing_bytes_ignored() {
        assert_eq!(ReplyCommand::parse(b"LED_GREEN_ON\0"), ReplyCommand::IndicatorOn);
        assert_eq!(ReplyCommand::parse(b"LED_GREEN_ON\r\n"), ReplyCommand::IndicatorOn);
        assert_eq!(ReplyCommand::parse(b""), ReplyCommand::Unknown);
        assert_eq!(ReplyCommand::parse(b"led_green_on"), ReplyCommand::Unknown);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_udp_transport_delivers() {
        let receiver = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut transport = UdpTransport::connect(receiver.local_addr().unwrap()).unwrap();

        assert_eq!(transport.send(b"04A1B2C3"), Ok(8));

        let mut buf = [0u8; 32];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"04A1B2C3");
    }
}
