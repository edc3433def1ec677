//! # Domain Module
//!
//! Document contract and errors for the cache store.

pub mod document;
pub mod errors;

pub use document::*;
pub use errors::*;
