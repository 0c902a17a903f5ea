//! Traits implemented by model objects
//!
//! Model objects are plain serde structs. These traits tie them to the
//! schema of the module that defines them.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::schema::ModuleSchema;

/// A top-level data node (container or list) of a YANG module
pub trait Entity: Serialize + DeserializeOwned + Default {
    /// YANG name of the node, without module prefix
    const YANG_NAME: &'static str;

    /// Schema of the defining module
    fn schema() -> Result<ModuleSchema>;
}

/// A YANG RPC with typed input and output
pub trait Rpc {
    type Input: Serialize;
    type Output: DeserializeOwned;

    /// YANG name of the RPC, without module prefix
    const YANG_NAME: &'static str;

    /// Schema of the defining module
    fn schema() -> Result<ModuleSchema>;

    /// Input parameters sent to the device
    fn input(&self) -> &Self::Input;
}
