//! # Adapters
//!
//! Production implementation of the `EventSource` port over Ethereum
//! JSON-RPC.

pub mod json_rpc;
pub mod types;

pub use json_rpc::{JsonRpcEventSource, RpcError};
