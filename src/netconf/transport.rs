//! NETCONF transports

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, trace};

use super::framing::Framer;
use crate::error::{NetconfError, Result};

/// A framed, message-oriented connection to a NETCONF server
pub trait Transport: Send {
    /// Send one complete message
    fn send(&mut self, message: &str) -> Result<()>;
    /// Block until one complete message has been received
    fn receive(&mut self) -> Result<String>;
    /// Switch to base:1.1 chunked framing
    fn upgrade(&mut self);
    fn close(&mut self) -> Result<()>;
}

/// NETCONF over plain TCP
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    framer: Framer,
    closed: bool,
}

/// Open a TCP connection to `host:port`, trying each resolved address in turn
pub(crate) fn connect_stream(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;

    for addr in (host, port).to_socket_addrs()? {
        debug!(%addr, "connecting");
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "connect failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err
        .map(NetconfError::Io)
        .unwrap_or_else(|| NetconfError::Protocol(format!("no address for {}", host))))
}

impl TcpTransport {
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let stream = connect_stream(host, port, timeout)?;
        Self::from_stream(stream, timeout)
    }

    /// Wrap an established stream
    pub fn from_stream(stream: TcpStream, timeout: Duration) -> Result<Self> {
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            framer: Framer::new(),
            closed: false,
        })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, message: &str) -> Result<()> {
        if self.closed {
            return Err(NetconfError::SessionClosed);
        }
        trace!(payload = %message, "send");
        let frame = self.framer.encode(message);
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<String> {
        if self.closed {
            return Err(NetconfError::SessionClosed);
        }

        let mut buf = [0u8; 8192];
        loop {
            if let Some(message) = self.framer.next_message()? {
                trace!(payload = %message, "receive");
                return Ok(message);
            }
            let n = self.stream.read(&mut buf)?;
            if n == 0 {
                return Err(NetconfError::Protocol(
                    "connection closed by peer".into(),
                ));
            }
            self.framer.push(&buf[..n]);
        }
    }

    fn upgrade(&mut self) {
        self.framer.upgrade();
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }
}
