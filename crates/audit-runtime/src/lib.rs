//! # Withdrawal-Audit Runtime
//!
//! Wires the subsystems to the outside world:
//!
//! - `config` - environment / `.env` / CLI layering and validation
//! - `adapters` - JSON-RPC [`EventSource`](shared_types::EventSource)
//! - `commands` - one entry point per CLI subcommand
//! - `telemetry` - tracing subscriber setup
//!
//! ## Pipeline
//!
//! ```text
//! sync-withdrawals ──→ withdrawals.json ─┐
//!                                        ├──→ check ──→ reconciliation.json ──→ summarize
//! fetch-transfers  ──→ transfers.json  ──┘
//!
//! scan-balances    ──→ balances.json
//! ```
//!
//! All documents live in the data directory, guarded by its `LOCK` file.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod telemetry;

pub use adapters::{JsonRpcEventSource, RpcError};
pub use config::{AuditConfig, CliOverrides, ConfigError};
