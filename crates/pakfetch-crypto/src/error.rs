//! Error types for key and decryption operations

use thiserror::Error;

/// Errors that can occur during key handling or decryption
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key identifier was not a well-formed GUID
    #[error("Invalid key GUID '{value}': {reason}")]
    InvalidGuid {
        /// The offending identifier text
        value: String,
        /// Reason the text was rejected
        reason: String,
    },

    /// Key material was not well-formed hex
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Key material has the wrong length for the cipher
    #[error("Invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Expected key size in bytes
        expected: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Ciphertext extent is not a whole number of cipher blocks
    #[error("Invalid ciphertext length {length}: not a multiple of {block} bytes")]
    InvalidBlockLength {
        /// Ciphertext length in bytes
        length: usize,
        /// Cipher block size in bytes
        block: usize,
    },

    /// One dynamic key entry could not be parsed
    ///
    /// Failing entries are skipped individually; they never abort the
    /// remaining entries.
    #[error("Malformed dynamic key entry '{entry}': {reason}")]
    MalformedDynamicKey {
        /// The entry text as found in settings
        entry: String,
        /// Reason the entry was rejected
        reason: String,
    },
}

/// Result alias for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CryptoError::InvalidKeySize {
            expected: 32,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Invalid key size: expected 32 bytes, got 2");

        let err = CryptoError::InvalidBlockLength {
            length: 17,
            block: 16,
        };
        assert_eq!(
            err.to_string(),
            "Invalid ciphertext length 17: not a multiple of 16 bytes"
        );
    }
}
