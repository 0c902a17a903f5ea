//! Executor service: runs YANG RPCs on a NETCONF device
//!
//! Helpers for building RPC payloads and decoding replies live here too, so
//! they can be used without a live provider.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::entity::Rpc;
use crate::error::Result;
use crate::provider::NetconfServiceProvider;
use crate::schema::ModuleSchema;
use crate::xml::{XmlElement, XmlEncoder, decode_children};

/// Executes RPCs through a provider
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorService;

impl ExecutorService {
    pub fn new() -> Self {
        Self
    }

    /// Send the RPC input to the device and decode its output
    pub fn execute_rpc<R: Rpc>(
        &self,
        provider: &mut NetconfServiceProvider,
        rpc: &R,
    ) -> Result<R::Output> {
        let schema = R::schema()?;
        let payload = build_rpc_payload(&schema, R::YANG_NAME, rpc.input())?;
        debug!(rpc = %schema.qualified_name(R::YANG_NAME), "executing rpc");

        let data = provider.session_mut()?.rpc(&payload)?;
        debug!(elements = data.len(), "rpc reply received");
        parse_rpc_output(&schema, R::YANG_NAME, &data)
    }
}

/// Build the operation element for an RPC
///
/// # Arguments
/// * `name` - RPC name like "ping"
/// * `input` - Input parameters, encoded as children of the RPC element
pub fn build_rpc_payload<I: Serialize>(schema: &ModuleSchema, name: &str, input: &I) -> Result<String> {
    let input_path = ModuleSchema::child_path(&schema.top_path(name), "input");
    let value = serde_json::to_value(input)?;
    XmlEncoder::new(schema).encode(name, &input_path, &value)
}

/// Decode the data elements of an <rpc-reply> as RPC output
///
/// A reply without data (`<ok/>`) decodes to the default output.
pub fn parse_rpc_output<O: DeserializeOwned>(
    schema: &ModuleSchema,
    name: &str,
    data: &[XmlElement],
) -> Result<O> {
    let output_path = ModuleSchema::child_path(&schema.top_path(name), "output");
    let value = decode_children(schema, &output_path, data)?;
    Ok(serde_json::from_value(value)?)
}
