//! NETCONF protocol plumbing
//!
//! Framing, transports and the session layer used by
//! [`NetconfServiceProvider`](crate::provider::NetconfServiceProvider).

pub mod framing;
pub mod session;
pub mod ssh;
pub mod transport;

pub use framing::{Framer, FramingMode};
pub use session::{Hello, NetconfSession, parse_rpc_reply};
pub use ssh::SshTransport;
pub use transport::{TcpTransport, Transport};

/// NETCONF base XML namespace
pub const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Base protocol capability, end-of-message framing
pub const CAP_BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";

/// Base protocol capability, chunked framing
pub const CAP_BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";
