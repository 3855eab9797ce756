//! Archive key management and AES decryption for pakfetch
//!
//! This crate holds the cryptographic pieces of the virtual file layer:
//! key identifiers, the process-wide key store, and the AES-256-ECB block
//! decryption applied to encrypted archive entries.
//!
//! # Components
//!
//! - **Key identifiers**: [`KeyGuid`], a 128-bit GUID-shaped value. The
//!   all-zero GUID conventionally identifies the primary archive key.
//! - **Key store**: [`KeyStore`], a concurrent last-write-wins map from
//!   identifier to hex-decoded key material.
//! - **Dynamic keys**: [`ArchiveKey::parse_dynamic`] parses the delimited
//!   `(Key="<hex>",Guid="<hex>")` entries found in settings files.
//! - **Decryption**: [`encryption::decrypt_in_place`] for the padded
//!   AES-256-ECB extents used by archive entries.
//!
//! # Examples
//!
//! ```
//! use pakfetch_crypto::{ArchiveKey, KeyGuid, KeyStore};
//!
//! let store = KeyStore::new();
//! let key = ArchiveKey::parse_dynamic(
//!     r#"(Key="1A2B",Guid="00000000-0000-0000-0000-000000000001")"#,
//! )?;
//! store.submit_key(key);
//!
//! let guid: KeyGuid = "00000000-0000-0000-0000-000000000001".parse()?;
//! assert_eq!(store.key_for(&guid), Some(vec![0x1A, 0x2B]));
//! # Ok::<(), pakfetch_crypto::CryptoError>(())
//! ```

#![warn(missing_docs)]

pub mod encryption;
pub mod error;
pub mod guid;
pub mod keys;

pub use error::CryptoError;
pub use guid::KeyGuid;
pub use keys::{ArchiveKey, KeyStore};
