//! # Error Types
//!
//! Errors shared by every subsystem.

use thiserror::Error;

use crate::entities::BlockNumber;

/// Errors raised while parsing primitive values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a 20-byte hex address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Not a non-negative decimal integer.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Errors returned by an [`EventSource`](crate::source::EventSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// RPC/network failure. Retried by the balance scanner, fatal elsewhere.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The source answered with something that could not be decoded.
    #[error("Malformed response for {what}: {reason}")]
    Malformed {
        /// Which request produced the payload.
        what: String,
        /// Decoding failure.
        reason: String,
    },

    /// Failure injected by a test source.
    #[error("Injected failure at block {block}")]
    Injected {
        /// Block whose fetch was failed.
        block: BlockNumber,
    },
}

impl SourceError {
    /// Shorthand for a decoding failure.
    pub fn malformed(what: impl Into<String>, reason: impl ToString) -> Self {
        SourceError::Malformed {
            what: what.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = SourceError::malformed("eth_blockNumber", "not hex");
        assert_eq!(
            err.to_string(),
            "Malformed response for eth_blockNumber: not hex"
        );
    }

    #[test]
    fn test_injected_error_names_block() {
        let err = SourceError::Injected { block: 4100 };
        assert!(err.to_string().contains("4100"));
    }
}
