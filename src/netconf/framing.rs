//! NETCONF message framing (RFC 6242)
//!
//! Sessions start with end-of-message framing and switch to chunked
//! framing once both peers advertise base:1.1.

use tracing::trace;

use crate::error::{NetconfError, Result};

/// End-of-message delimiter used by NETCONF 1.0
pub const NETCONF_1_0_TERMINATOR: &str = "]]>]]>";

/// Largest chunk size allowed by RFC 6242
const MAX_CHUNK_SIZE: u64 = 4_294_967_295;

/// Longest chunk-size field: 10 digits
const MAX_CHUNK_DIGITS: usize = 10;

/// Default cap on bytes buffered for a single incoming message
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingMode {
    #[default]
    EndOfMessage,
    Chunked,
}

/// Incremental framer: encodes outgoing messages, reassembles incoming ones
#[derive(Debug)]
pub struct Framer {
    mode: FramingMode,
    buffer: Vec<u8>,
    /// Offset in `buffer` already searched for the end-of-message delimiter
    scanned: usize,
    max_message_size: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self {
            mode: FramingMode::default(),
            buffer: Vec::new(),
            scanned: 0,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many bytes may be buffered while waiting for a message
    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max;
        self
    }

    pub fn mode(&self) -> FramingMode {
        self.mode
    }

    /// Switch to chunked framing
    pub fn upgrade(&mut self) {
        self.mode = FramingMode::Chunked;
        self.scanned = 0;
    }

    /// Frame a message for the wire
    pub fn encode(&self, message: &str) -> Vec<u8> {
        match self.mode {
            FramingMode::EndOfMessage => format!("{}\n{}\n", message, NETCONF_1_0_TERMINATOR).into_bytes(),
            FramingMode::Chunked => {
                let mut out = format!("\n#{}\n", message.len()).into_bytes();
                out.extend_from_slice(message.as_bytes());
                out.extend_from_slice(b"\n##\n");
                out
            }
        }
    }

    /// Append bytes received from the transport
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet consumed as a complete message
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Extract the next complete message, if one has been received
    pub fn next_message(&mut self) -> Result<Option<String>> {
        let frame = match self.mode {
            FramingMode::EndOfMessage => self.next_eom_frame(),
            FramingMode::Chunked => self.next_chunked_frame()?,
        };

        if frame.is_none() && self.buffer.len() > self.max_message_size {
            return Err(NetconfError::Framing(format!(
                "message exceeds {} bytes",
                self.max_message_size
            )));
        }

        frame
            .map(|bytes| {
                trace!(len = bytes.len(), "received frame");
                String::from_utf8(bytes).map_err(|e| NetconfError::Framing(e.to_string()))
            })
            .transpose()
    }

    fn next_eom_frame(&mut self) -> Option<Vec<u8>> {
        let delimiter = NETCONF_1_0_TERMINATOR.as_bytes();
        let start = self.scanned;
        let Some(found) = self.buffer[start..]
            .windows(delimiter.len())
            .position(|w| w == delimiter)
        else {
            // A delimiter split across reads starts in the last few bytes
            self.scanned = self.buffer.len().saturating_sub(delimiter.len() - 1);
            return None;
        };

        let pos = start + found;
        let mut frame: Vec<u8> = self.buffer.drain(..pos + delimiter.len()).collect();
        frame.truncate(pos);
        self.scanned = 0;
        Some(frame)
    }

    fn next_chunked_frame(&mut self) -> Result<Option<Vec<u8>>> {
        let buf = &self.buffer;
        let mut pos = 0;
        let mut message = Vec::new();

        // Whitespace left over from a previous end-of-message frame
        while pos < buf.len()
            && buf[pos].is_ascii_whitespace()
            && !(buf[pos] == b'\n' && buf.get(pos + 1) == Some(&b'#'))
        {
            pos += 1;
        }

        loop {
            if buf.len() < pos + 3 {
                return Ok(None);
            }
            if buf[pos] != b'\n' || buf[pos + 1] != b'#' {
                return Err(NetconfError::Framing(format!(
                    "expected chunk header at offset {}",
                    pos
                )));
            }

            // End of chunks: "\n##\n"
            if buf[pos + 2] == b'#' {
                if buf.len() < pos + 4 {
                    return Ok(None);
                }
                if buf[pos + 3] != b'\n' {
                    return Err(NetconfError::Framing("malformed end-of-chunks marker".into()));
                }
                if message.is_empty() {
                    return Err(NetconfError::Framing("end-of-chunks without data".into()));
                }
                self.buffer.drain(..pos + 4);
                return Ok(Some(message));
            }

            let digits_start = pos + 2;
            let Some(len_digits) = buf[digits_start..].iter().position(|b| *b == b'\n') else {
                let partial = &buf[digits_start..];
                if partial.len() > MAX_CHUNK_DIGITS || !partial.iter().all(u8::is_ascii_digit) {
                    return Err(NetconfError::Framing("malformed chunk size".into()));
                }
                return Ok(None);
            };

            let digits = &buf[digits_start..digits_start + len_digits];
            let size = parse_chunk_size(digits)?;
            let data_start = digits_start + len_digits + 1;
            if buf.len() < data_start + size {
                return Ok(None);
            }
            message.extend_from_slice(&buf[data_start..data_start + size]);
            pos = data_start + size;
        }
    }
}

fn parse_chunk_size(digits: &[u8]) -> Result<usize> {
    let malformed = || NetconfError::Framing("malformed chunk size".into());

    if digits.is_empty()
        || digits.len() > MAX_CHUNK_DIGITS
        || digits[0] == b'0'
        || !digits.iter().all(u8::is_ascii_digit)
    {
        return Err(malformed());
    }
    let size: u64 = std::str::from_utf8(digits)
        .map_err(|_| malformed())?
        .parse()
        .map_err(|_| malformed())?;
    if size > MAX_CHUNK_SIZE {
        return Err(malformed());
    }
    usize::try_from(size).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eom_roundtrip_with_split_reads() {
        let mut framer = Framer::new();
        let wire = framer.encode("<hello/>");

        framer.push(&wire[..5]);
        assert_eq!(framer.next_message().unwrap(), None);
        framer.push(&wire[5..]);
        assert_eq!(framer.next_message().unwrap().unwrap().trim(), "<hello/>");
        // Trailing newline stays buffered until the next frame
        assert_eq!(framer.next_message().unwrap(), None);
    }

    #[test]
    fn test_eom_two_messages_in_one_read() {
        let mut framer = Framer::new();
        framer.push(b"<a/>]]>]]><b/>]]>]]>");
        assert_eq!(framer.next_message().unwrap().as_deref(), Some("<a/>"));
        assert_eq!(framer.next_message().unwrap().as_deref(), Some("<b/>"));
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_eom_delimiter_split_across_reads() {
        let mut framer = Framer::new();
        framer.push(b"<rpc-reply><data>0123456789</data></rpc-reply>]]");
        assert_eq!(framer.next_message().unwrap(), None);
        framer.push(b">]");
        assert_eq!(framer.next_message().unwrap(), None);
        framer.push(b"]>");
        assert_eq!(
            framer.next_message().unwrap().as_deref(),
            Some("<rpc-reply><data>0123456789</data></rpc-reply>")
        );

        // Scanning restarts at the front of the next message
        framer.push(b"]]>]]>");
        assert_eq!(framer.next_message().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_oversized_message_rejected() {
        let mut framer = Framer::new().with_max_message_size(16);
        framer.push(b"<a>0123456789</a>");
        assert!(matches!(framer.next_message(), Err(NetconfError::Framing(_))));

        let mut framer = Framer::new().with_max_message_size(16);
        framer.upgrade();
        framer.push(b"\n#20\n01234567890123");
        assert!(matches!(framer.next_message(), Err(NetconfError::Framing(_))));

        // A complete frame under the limit is still delivered
        let mut framer = Framer::new().with_max_message_size(16);
        framer.push(b"<a/>]]>]]>");
        assert_eq!(framer.next_message().unwrap().as_deref(), Some("<a/>"));
    }

    #[test]
    fn test_chunked_encode() {
        let mut framer = Framer::new();
        assert_eq!(framer.mode(), FramingMode::EndOfMessage);
        framer.upgrade();
        assert_eq!(framer.mode(), FramingMode::Chunked);
        assert_eq!(framer.encode("<rpc/>"), b"\n#6\n<rpc/>\n##\n".to_vec());
    }

    #[test]
    fn test_chunked_multiple_chunks() {
        let mut framer = Framer::new();
        framer.upgrade();
        let wire = b"\n#4\n<rpc\n#18\n message-id=\"102\">\n#6\n</rpc>\n##\n";

        // Feed byte by byte
        let mut messages = Vec::new();
        for b in wire.iter() {
            framer.push(&[*b]);
            if let Some(msg) = framer.next_message().unwrap() {
                messages.push(msg);
            }
        }
        assert_eq!(messages, vec![r#"<rpc message-id="102"></rpc>"#.to_string()]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_chunked_after_eom_hello() {
        let mut framer = Framer::new();
        framer.push(b"<hello/>]]>]]>\n\n#3\n<a/\n#1\n>\n##\n");
        assert_eq!(framer.next_message().unwrap().as_deref(), Some("<hello/>"));
        framer.upgrade();
        assert_eq!(framer.next_message().unwrap().as_deref(), Some("<a/>"));
    }

    #[test]
    fn test_chunked_malformed_headers() {
        let bad: [&[u8]; 5] = [
            b"#4\n<rpc\n##\n",
            b"\n#04\n<rpc\n##\n",
            b"\n#0\n\n##\n",
            b"\n#x\n",
            b"\n#99999999999\n",
        ];

        for wire in bad {
            let mut framer = Framer::new();
            framer.upgrade();
            framer.push(wire);
            assert!(
                matches!(framer.next_message(), Err(NetconfError::Framing(_))),
                "{:?} should be rejected",
                String::from_utf8_lossy(wire)
            );
        }
    }

    #[test]
    fn test_chunked_empty_message_rejected() {
        let mut framer = Framer::new();
        framer.upgrade();
        framer.push(b"\n##\n");
        assert!(framer.next_message().is_err());
    }
}
