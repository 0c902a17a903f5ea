//! Model objects for the bundled YANG modules
//!
//! Each module ships with a pre-compiled schema under `schemas/`.

pub mod ncs1k_mxp_cfg;
pub mod ping_act;

pub use ncs1k_mxp_cfg::HardwareModule;
pub use ping_act::PingRpc;
