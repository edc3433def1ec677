//! # Algorithms
//!
//! Pure batch planning and merge logic, plus the batch retry policy.

pub mod partition;
pub mod retry;

pub use partition::{merge_first_seen, plan_batches, split_range};
pub use retry::{RetryExhausted, RetryPolicy};
