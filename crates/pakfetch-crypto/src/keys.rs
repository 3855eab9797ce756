//! Archive key material and the key store
//!
//! Keys decrypt encrypted archive entries and are addressed by [`KeyGuid`].
//! The store is populated at startup from settings (the primary key plus
//! any dynamic keys) and may be extended later; submission is a
//! last-write-wins upsert.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::error::{CryptoError, Result};
use crate::guid::KeyGuid;

/// One archive key: identifier plus hex-decoded key material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveKey {
    /// Key identifier
    pub guid: KeyGuid,
    /// Key material bytes
    ///
    /// Length is validated where the material is used; the AES layer
    /// requires 32 bytes.
    pub material: Vec<u8>,
}

impl ArchiveKey {
    /// Create a key from an identifier and raw material
    pub const fn new(guid: KeyGuid, material: Vec<u8>) -> Self {
        Self { guid, material }
    }

    /// Parse key material from a hex string
    pub fn from_hex(guid: KeyGuid, hex: &str) -> Result<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
        let material =
            hex::decode(hex).map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;

        if material.is_empty() {
            return Err(CryptoError::InvalidKeyMaterial("empty key".to_string()));
        }

        Ok(Self { guid, material })
    }

    /// Parse one dynamic key entry of the form `(Key="<hex>",Guid="<hex>")`
    ///
    /// A malformed entry fails only itself; callers iterating a list of
    /// entries should log the error and continue with the rest.
    pub fn parse_dynamic(entry: &str) -> Result<Self> {
        let malformed = |reason: String| CryptoError::MalformedDynamicKey {
            entry: entry.to_string(),
            reason,
        };

        let trimmed = entry.trim();
        let open = trimmed
            .find('(')
            .ok_or_else(|| malformed("missing opening parenthesis".to_string()))?;
        let close = trimmed
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| malformed("missing closing parenthesis".to_string()))?;

        let body = &trimmed[open + 1..close];
        let (key_field, guid_field) = body
            .split_once(',')
            .ok_or_else(|| malformed("expected two comma-separated fields".to_string()))?;

        let key_hex = quoted_value(key_field, "Key").map_err(&malformed)?;
        let guid_text = quoted_value(guid_field, "Guid").map_err(&malformed)?;

        let guid: KeyGuid = guid_text.parse().map_err(|e: CryptoError| malformed(e.to_string()))?;

        Self::from_hex(guid, key_hex).map_err(|e| malformed(e.to_string()))
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.guid, hex::encode_upper(&self.material))
    }
}

/// Extract the quoted value of a `Name="value"` field
fn quoted_value<'a>(field: &'a str, name: &str) -> std::result::Result<&'a str, String> {
    let (field_name, value) = field
        .split_once('=')
        .ok_or_else(|| format!("field '{}' has no '='", field.trim()))?;

    if !field_name.trim().eq_ignore_ascii_case(name) {
        return Err(format!(
            "expected field '{name}', found '{}'",
            field_name.trim()
        ));
    }

    value
        .trim()
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(|| format!("field '{name}' value is not quoted"))
}

/// Concurrent store of archive keys
///
/// Submission is an idempotent last-write-wins upsert. Reads and writes may
/// interleave freely; a reader sees either the old or the new material for
/// an identifier, never a partial value.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: RwLock<HashMap<KeyGuid, Vec<u8>>>,
}

impl KeyStore {
    /// Create an empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit key material for an identifier, replacing any existing value
    pub fn submit(&self, guid: KeyGuid, material: Vec<u8>) {
        self.keys.write().insert(guid, material);
    }

    /// Submit an [`ArchiveKey`], replacing any existing value for its GUID
    pub fn submit_key(&self, key: ArchiveKey) {
        self.submit(key.guid, key.material);
    }

    /// Look up key material by identifier
    pub fn key_for(&self, guid: &KeyGuid) -> Option<Vec<u8>> {
        self.keys.read().get(guid).cloned()
    }

    /// Whether material is registered for an identifier
    pub fn contains(&self, guid: &KeyGuid) -> bool {
        self.keys.read().contains_key(guid)
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_hex() {
        let key = ArchiveKey::from_hex(KeyGuid::ZERO, "1A2B").expect("valid key");
        assert_eq!(key.material, vec![0x1A, 0x2B]);

        let key = ArchiveKey::from_hex(KeyGuid::ZERO, "0x1A2B").expect("valid key");
        assert_eq!(key.material, vec![0x1A, 0x2B]);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(ArchiveKey::from_hex(KeyGuid::ZERO, "xyz").is_err());
        assert!(ArchiveKey::from_hex(KeyGuid::ZERO, "").is_err());
        assert!(ArchiveKey::from_hex(KeyGuid::ZERO, "1A2").is_err());
    }

    #[test]
    fn test_parse_dynamic_entry() {
        let key = ArchiveKey::parse_dynamic(
            r#"(Key="1A2B",Guid="00000000-0000-0000-0000-000000000001")"#,
        )
        .expect("valid entry");

        assert_eq!(key.material, vec![0x1A, 0x2B]);
        assert_eq!(
            key.guid,
            "00000000-0000-0000-0000-000000000001"
                .parse()
                .expect("valid guid")
        );
    }

    #[test]
    fn test_parse_dynamic_entry_plain_hex_guid() {
        let key = ArchiveKey::parse_dynamic(
            r#"(Key="DEADBEEF",Guid="0123456789abcdef0123456789abcdef")"#,
        )
        .expect("valid entry");
        assert_eq!(key.material, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_parse_dynamic_entry_malformed() {
        let cases = [
            "no parens at all",
            r#"(Key="1A2B")"#,
            r#"(Guid="00000000-0000-0000-0000-000000000001",Key="1A2B")"#,
            r#"(Key=1A2B,Guid="00000000-0000-0000-0000-000000000001")"#,
            r#"(Key="1A2B",Guid="nope")"#,
            r#"(Key="nothex",Guid="00000000-0000-0000-0000-000000000001")"#,
        ];

        for case in cases {
            let result = ArchiveKey::parse_dynamic(case);
            assert!(
                matches!(result, Err(CryptoError::MalformedDynamicKey { .. })),
                "expected malformed error for {case:?}"
            );
        }
    }

    #[test]
    fn test_store_submit_and_lookup() {
        let store = KeyStore::new();
        let guid: KeyGuid = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid guid");

        assert!(store.is_empty());
        assert_eq!(store.key_for(&guid), None);

        store.submit(guid, vec![0x1A, 0x2B]);
        assert_eq!(store.key_for(&guid), Some(vec![0x1A, 0x2B]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_last_submission_wins() {
        let store = KeyStore::new();
        store.submit(KeyGuid::ZERO, vec![1; 32]);
        store.submit(KeyGuid::ZERO, vec![2; 32]);

        assert_eq!(store.key_for(&KeyGuid::ZERO), Some(vec![2; 32]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_separate_identifiers() {
        let store = KeyStore::new();
        let other: KeyGuid = "00000000-0000-0000-0000-000000000002"
            .parse()
            .expect("valid guid");

        store.submit(KeyGuid::ZERO, vec![1; 32]);
        store.submit(other, vec![2; 32]);

        assert_eq!(store.key_for(&KeyGuid::ZERO), Some(vec![1; 32]));
        assert_eq!(store.key_for(&other), Some(vec![2; 32]));
        assert_eq!(store.len(), 2);
    }
}
