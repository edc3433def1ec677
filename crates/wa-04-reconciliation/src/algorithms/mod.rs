//! # Algorithms
//!
//! Pure reconciliation logic. Nothing here touches storage or the network.

pub mod claims;
pub mod intervals;

pub use claims::claims_by_recipient;
pub use intervals::{reconcile, Reconciliation};
