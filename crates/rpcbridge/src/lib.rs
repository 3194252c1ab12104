//! rpcbridge
//!
//! Stdio to HTTP JSON-RPC bridge, exposed as a library for testing.

pub mod bridge;

pub use bridge::{Bridge, BridgeError};
