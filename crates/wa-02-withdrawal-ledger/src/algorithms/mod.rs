//! # Algorithms Module
//!
//! Chunk planning for incremental sync.

pub mod chunking;

pub use chunking::{next_chunk, plan_chunks};
