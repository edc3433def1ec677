//! # Application Layer
//!
//! Typed access to documents.

pub mod service;

pub use service::CacheStore;
