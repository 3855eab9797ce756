//! AES-256-ECB block decryption for archive entries
//!
//! Encrypted archive extents are whole AES blocks: the plain bytes are
//! zero-padded up to a 16-byte boundary before encryption, and callers
//! truncate back to the plain size after decryption.

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::error::{CryptoError, Result};

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Round a plain size up to the padded extent stored on disk
pub const fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

fn build_cipher(key: &[u8]) -> Result<Aes256> {
    Aes256::new_from_slice(key).map_err(|_| CryptoError::InvalidKeySize {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

fn check_extent(data: &[u8]) -> Result<()> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidBlockLength {
            length: data.len(),
            block: BLOCK_SIZE,
        });
    }
    Ok(())
}

/// Decrypt a padded extent in place
///
/// The key must be exactly [`KEY_SIZE`] bytes and the data a whole number
/// of [`BLOCK_SIZE`] blocks.
pub fn decrypt_in_place(key: &[u8], data: &mut [u8]) -> Result<()> {
    let cipher = build_cipher(key)?;
    check_extent(data)?;

    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    Ok(())
}

/// Encrypt a padded extent in place
///
/// Counterpart of [`decrypt_in_place`], used by archive builders.
pub fn encrypt_in_place(key: &[u8], data: &mut [u8]) -> Result<()> {
    let cipher = build_cipher(key)?;
    check_extent(data)?;

    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    Ok(())
}
