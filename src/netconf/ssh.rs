//! NETCONF over SSH (RFC 6242)
//!
//! Password authentication, then the `netconf` subsystem on a session
//! channel. Framing is the same as on the TCP transport.

use std::io::{Read, Write};
use std::time::Duration;

use ssh2::{Channel, Session};
use tracing::{debug, trace};

use super::framing::Framer;
use super::transport::{Transport, connect_stream};
use crate::error::{NetconfError, Result};

/// SSH subsystem name for NETCONF
const NETCONF_SUBSYSTEM: &str = "netconf";

pub struct SshTransport {
    session: Session,
    channel: Channel,
    framer: Framer,
    closed: bool,
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("mode", &self.framer.mode())
            .field("closed", &self.closed)
            .finish()
    }
}

impl SshTransport {
    /// Connect, authenticate and start the netconf subsystem
    pub fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let stream = connect_stream(host, port, timeout)?;

        let mut session = Session::new()?;
        session.set_tcp_stream(stream);
        session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        session.handshake()?;
        debug!(host, port, "ssh handshake complete");

        session.userauth_password(username, password)?;
        if !session.authenticated() {
            return Err(NetconfError::Authentication(username.to_string()));
        }

        let mut channel = session.channel_session()?;
        channel.subsystem(NETCONF_SUBSYSTEM)?;
        debug!(host, username, "netconf subsystem started");

        Ok(Self {
            session,
            channel,
            framer: Framer::new(),
            closed: false,
        })
    }
}

impl Transport for SshTransport {
    fn send(&mut self, message: &str) -> Result<()> {
        if self.closed {
            return Err(NetconfError::SessionClosed);
        }
        trace!(payload = %message, "send");
        let frame = self.framer.encode(message);
        self.channel.write_all(&frame)?;
        self.channel.flush()?;
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
            let n = self.channel.read(&mut buf)?;
            if n == 0 {
                return Err(NetconfError::Protocol("channel closed by peer".into()));
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

        let eof = self.channel.send_eof();
        let channel = self.channel.close();
        let disconnect = self
            .session
            .disconnect(None, "closing netconf session", None);
        eof.and(channel).and(disconnect)?;
        Ok(())
    }
}
