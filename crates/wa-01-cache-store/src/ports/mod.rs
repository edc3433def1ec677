//! # Ports Module
//!
//! Outbound storage port of the cache store.

pub mod outbound;

pub use outbound::*;
