//! Key identifiers
//!
//! Archive keys are addressed by a 128-bit GUID-shaped value. The all-zero
//! GUID is the conventional identifier of the primary archive key.

use std::fmt;
use std::str::FromStr;

use crate::error::CryptoError;

/// A 128-bit archive key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyGuid([u8; 16]);

impl KeyGuid {
    /// The all-zero identifier of the primary archive key
    pub const ZERO: Self = Self([0u8; 16]);

    /// Create an identifier from raw bytes
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Whether this is the primary (all-zero) identifier
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 16]
    }
}

impl Default for KeyGuid {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for KeyGuid {
    type Err = CryptoError;

    /// Parse either the hyphenated `8-4-4-4-12` form or 32 plain hex digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let compact: String = trimmed.chars().filter(|c| *c != '-').collect();

        if compact.len() != 32 {
            return Err(CryptoError::InvalidGuid {
                value: trimmed.to_string(),
                reason: format!("expected 32 hex digits, got {}", compact.len()),
            });
        }

        let bytes = hex::decode(&compact).map_err(|e| CryptoError::InvalidGuid {
            value: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        let mut guid = [0u8; 16];
        guid.copy_from_slice(&bytes);
        Ok(Self(guid))
    }
}

impl fmt::Display for KeyGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode_upper(self.0);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}
