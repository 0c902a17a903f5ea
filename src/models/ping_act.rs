//! Cisco-IOS-XR-ping-act: the `ping` RPC

use serde::{Deserialize, Serialize};

use crate::entity::Rpc;
use crate::error::Result;
use crate::schema::ModuleSchema;

const SCHEMA: &str = include_str!("schemas/Cisco-IOS-XR-ping-act.json");

/// Ping RPC: input to send, output once executed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingRpc {
    pub input: PingInput,
    /// Set by the caller from the executor's result
    pub output: Option<PingOutput>,
}

impl Rpc for PingRpc {
    type Input = PingInput;
    type Output = PingOutput;

    const YANG_NAME: &'static str = "ping";

    fn schema() -> Result<ModuleSchema> {
        ModuleSchema::from_json_str(SCHEMA)
    }

    fn input(&self) -> &PingInput {
        &self.input
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PingInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv6: Vec<Ipv6Destination>,
}

/// IPv4 ping parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_service: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_frag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing_interface: Option<String>,
}

/// IPv6 ping parameters, keyed by destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ipv6Destination {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing_interface: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PingOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_response: Option<PingResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PingResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ipv4: Vec<Ipv4Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Response>,
}

/// Result of pinging one destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ipv4Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_pattern: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_avg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Replies>,
}

/// The IPv6 response carries the same leaves as an IPv4 entry
pub type Ipv6Response = Ipv4Response;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Replies {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply: Vec<Reply>,
}

/// One echo reply; `result` is the per-packet marker printed by the device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Reply {
    pub reply_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_reply_addresses: Option<BroadcastReplyAddresses>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BroadcastReplyAddresses {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broadcast_reply_address: Vec<BroadcastReplyAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BroadcastReplyAddress {
    pub reply_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}
