//! Cisco-IOS-XR-ncs1k-mxp-cfg: NCS 1000 muxponder slice configuration

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::Result;
use crate::schema::ModuleSchema;

const SCHEMA: &str = include_str!("schemas/Cisco-IOS-XR-ncs1k-mxp-cfg.json");

/// Hardware module configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HardwareModule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node: Vec<Node>,
}

impl Entity for HardwareModule {
    const YANG_NAME: &'static str = "hardware-module";

    fn schema() -> Result<ModuleSchema> {
        ModuleSchema::from_json_str(SCHEMA)
    }
}

/// Line card, keyed by location (e.g. "0/RP0/CPU0")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Node {
    pub location: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slice: Vec<Slice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Slice {
    pub slice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<SliceValues>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub client_port: Vec<ClientPort>,
}

/// Data rates and options applied to a slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SliceValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_rate: Option<ClientDataRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk_rate: Option<TrunkDataRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fec: Option<Fec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lldp: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientPort {
    pub client_port_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lldp_drop: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientDataRate {
    TenGig,
    FortyGig,
    HundredGig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrunkDataRate {
    HundredGig,
    TwoHundredGig,
    TwoHundredFiftyGig,
}

/// Forward error correction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fec {
    Sd7,
    Sd20,
}
