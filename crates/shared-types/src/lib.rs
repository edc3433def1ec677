//! # Shared Types Crate
//!
//! Chain records and the outbound event-source port shared by every
//! Withdrawal-Audit subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, amounts, withdrawals and transfer
//!   events are defined once here.
//! - **Lowercase identity**: [`Address`] always renders as lowercase `0x` hex,
//!   so every persisted map is keyed the same way regardless of the casing the
//!   RPC node returned.
//! - **Exact integers**: every amount is a [`U256`]; nothing touches floating
//!   point. On disk amounts are decimal strings (see [`DecimalU256`]).

pub mod amount;
pub mod entities;
pub mod errors;
pub mod source;

pub use amount::{parse_decimal, DecimalU256};
pub use entities::*;
pub use errors::*;
pub use source::{EventSource, InMemoryEventSource};
