//! Error types for rust-netconf

use thiserror::Error;

/// Main error type for codec, session and executor operations
#[derive(Debug, Error)]
pub enum NetconfError {
    /// Device URL could not be parsed
    #[error("Invalid device URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// URL scheme does not name a supported transport
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// Codec encoding name not recognised
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// IO error (socket operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SSH handshake, authentication or channel failure
    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    /// Device rejected the supplied credentials
    #[error("Authentication failed for user '{0}'")]
    Authentication(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing/serialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed NETCONF message framing
    #[error("Framing error: {0}")]
    Framing(String),

    /// Peer violated the NETCONF protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Device answered with an <rpc-error>
    #[error("RPC error ({tag}): {message}")]
    Rpc { tag: String, message: String },

    /// Operation attempted on a closed session or provider
    #[error("Session is closed")]
    SessionClosed,

    /// Leaf value does not match its YANG type
    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    /// Data node has no entry in the module schema
    #[error("Schema node not found: {0}")]
    SchemaNodeNotFound(String),

    /// Module schema file is inconsistent
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Expected data missing from a response
    #[error("Missing data: {0}")]
    MissingData(String),
}

impl From<quick_xml::Error> for NetconfError {
    fn from(e: quick_xml::Error) -> Self {
        NetconfError::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for NetconfError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        NetconfError::Xml(e.to_string())
    }
}

/// Result type alias for rust-netconf operations
pub type Result<T> = std::result::Result<T, NetconfError>;
