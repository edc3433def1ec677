//! # Domain Errors
//!
//! Error types for the cache store.

use thiserror::Error;

/// Cache store errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing storage failed.
    #[error("I/O error on {document}: {source}")]
    Io {
        /// Document name.
        document: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The stored bytes are not a valid document.
    #[error("Corrupt document {document}: {reason}")]
    Corrupt {
        /// Document name.
        document: String,
        /// Parse failure.
        reason: String,
    },

    /// The document could not be encoded.
    #[error("Failed to encode {document}: {reason}")]
    Encode {
        /// Document name.
        document: String,
        /// Encoder failure.
        reason: String,
    },

    /// Another process holds the data directory.
    #[error("Data directory already in use ({path})")]
    Locked {
        /// Lock file path.
        path: String,
    },
}

impl CacheError {
    /// Wrap an I/O error for `document`.
    pub fn io(document: impl Into<String>, source: std::io::Error) -> Self {
        CacheError::Io {
            document: document.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_error_names_document() {
        let err = CacheError::Corrupt {
            document: "withdrawals.json".to_string(),
            reason: "EOF while parsing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Corrupt document withdrawals.json: EOF while parsing"
        );
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = CacheError::io(
            "balances.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("balances.json"));
    }
}
