//! NETCONF session layer: capability exchange, rpc round trips, close-session

use quick_xml::escape::escape;
use tracing::{debug, warn};

use super::transport::Transport;
use super::{BASE_NS, CAP_BASE_1_0, CAP_BASE_1_1};
use crate::error::{NetconfError, Result};
use crate::xml::XmlElement;

/// First message-id used by a session
const FIRST_MESSAGE_ID: u64 = 101;

/// Contents of a <hello> message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hello {
    pub capabilities: Vec<String>,
    /// Present in server hellos only
    pub session_id: Option<u32>,
}

impl Hello {
    /// Hello sent by this client
    pub fn client() -> Self {
        Self {
            capabilities: vec![CAP_BASE_1_0.to_string(), CAP_BASE_1_1.to_string()],
            session_id: None,
        }
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if root.name != "hello" {
            return Err(NetconfError::Protocol(format!(
                "expected <hello>, received <{}>",
                root.name
            )));
        }

        let capabilities = root
            .child("capabilities")
            .map(|caps| {
                caps.children_named("capability")
                    .map(|c| c.text.clone())
                    .collect()
            })
            .unwrap_or_default();

        let session_id = root
            .child_text("session-id")
            .map(|id| {
                id.parse::<u32>()
                    .map_err(|_| NetconfError::Protocol(format!("invalid session-id '{}'", id)))
            })
            .transpose()?;

        Ok(Self {
            capabilities,
            session_id,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><hello xmlns="{}"><capabilities>"#,
            BASE_NS
        );
        for capability in &self.capabilities {
            xml.push_str("<capability>");
            xml.push_str(&escape(capability.as_str()));
            xml.push_str("</capability>");
        }
        xml.push_str("</capabilities>");
        if let Some(id) = self.session_id {
            xml.push_str(&format!("<session-id>{}</session-id>", id));
        }
        xml.push_str("</hello>");
        xml
    }

    /// Whether a capability is advertised, ignoring URI parameters
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.split('?').next() == Some(capability))
    }
}

/// An established NETCONF session
pub struct NetconfSession {
    transport: Box<dyn Transport>,
    server: Hello,
    next_message_id: u64,
    closed: bool,
}

impl std::fmt::Debug for NetconfSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetconfSession")
            .field("session_id", &self.server.session_id)
            .field("next_message_id", &self.next_message_id)
            .field("closed", &self.closed)
            .finish()
    }
}

impl NetconfSession {
    /// Exchange hellos over a connected transport
    pub fn establish(mut transport: Box<dyn Transport>) -> Result<Self> {
        transport.send(&Hello::client().to_xml())?;
        let server = Hello::parse(&transport.receive()?)?;

        let session_id = server
            .session_id
            .ok_or_else(|| NetconfError::Protocol("server hello without session-id".into()))?;

        if server.supports(CAP_BASE_1_1) {
            transport.upgrade();
        } else if !server.supports(CAP_BASE_1_0) {
            return Err(NetconfError::Protocol(
                "server advertises no common base capability".into(),
            ));
        }

        debug!(
            session_id,
            capabilities = server.capabilities.len(),
            chunked = server.supports(CAP_BASE_1_1),
            "session established"
        );

        Ok(Self {
            transport,
            server,
            next_message_id: FIRST_MESSAGE_ID,
            closed: false,
        })
    }

    pub fn session_id(&self) -> Option<u32> {
        self.server.session_id
    }

    /// Capabilities advertised by the server
    pub fn server_capabilities(&self) -> &[String] {
        &self.server.capabilities
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Send one operation and return the data elements of its reply
    ///
    /// An `<ok/>` reply yields no elements.
    pub fn rpc(&mut self, operation: &str) -> Result<Vec<XmlElement>> {
        if self.closed {
            return Err(NetconfError::SessionClosed);
        }
        self.exchange(operation)
    }

    /// Send <close-session/> and release the transport; idempotent
    pub fn close_session(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let reply = self.exchange("<close-session/>");
        let shutdown = self.transport.close();
        debug!(session_id = ?self.server.session_id, "session closed");
        reply.and(shutdown)
    }

    fn exchange(&mut self, operation: &str) -> Result<Vec<XmlElement>> {
        let message_id = self.next_message_id.to_string();
        self.next_message_id += 1;

        let request = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><rpc message-id="{}" xmlns="{}">{}</rpc>"#,
            message_id, BASE_NS, operation
        );
        debug!(message_id = %message_id, "sending rpc");
        self.transport.send(&request)?;

        let reply = self.transport.receive()?;
        parse_rpc_reply(&reply, &message_id)
    }
}

/// Parse an <rpc-reply>, turning <rpc-error> into an error
pub fn parse_rpc_reply(xml: &str, expected_message_id: &str) -> Result<Vec<XmlElement>> {
    let root = XmlElement::parse(xml)?;
    if root.name != "rpc-reply" {
        return Err(NetconfError::Protocol(format!(
            "expected <rpc-reply>, received <{}>",
            root.name
        )));
    }

    if let Some(id) = root.attribute("message-id")
        && id != expected_message_id
    {
        return Err(NetconfError::Protocol(format!(
            "reply message-id {} does not match request {}",
            id, expected_message_id
        )));
    }

    let mut first_error = None;
    for error in root.children_named("rpc-error") {
        let tag = error.child_text("error-tag").unwrap_or("unknown").to_string();
        let message = error
            .child_text("error-message")
            .map(str::to_string)
            .unwrap_or_else(|| tag.clone());

        if error.child_text("error-severity") == Some("warning") {
            warn!(tag = %tag, "rpc warning: {}", message);
        } else if first_error.is_none() {
            first_error = Some(NetconfError::Rpc { tag, message });
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    if root.child("ok").is_some() {
        return Ok(Vec::new());
    }

    Ok(root
        .children
        .into_iter()
        .filter(|c| c.name != "rpc-error")
        .collect())
}
