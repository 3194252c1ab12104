//! rpcbridge core
//!
//! JSON-RPC protocol types and bridge configuration shared by the
//! forwarding client and the stdio bridge.

pub mod config;
pub mod error;
pub mod protocol;

pub use config::{BridgeConfig, ConfigStorage};
pub use error::{Error, Result};
pub use protocol::{Envelope, ErrorCode, JsonRpcError, RequestId, Response, JSONRPC_VERSION};
