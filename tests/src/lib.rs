//! # Withdrawal-Audit Test Suite
//!
//! Cross-subsystem tests. Unit tests live next to the code in each crate;
//! this crate drives several subsystems against one data directory.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # ledger → reconciliation
//!     └── resume.rs     # restarts, retries and interrupted runs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wa-tests
//! cargo test -p wa-tests integration::resume::
//! ```

pub mod integration;
