// src/core/key.rs
//! Passphrase → AES-256 key + CBC IV
//!
//! # Compatibility-mode encryption
//!
//! The IV is derived from the passphrase, not drawn at random, so every value
//! encrypted under one passphrase shares it. Identical plaintexts produce
//! identical ciphertexts (no IND-CPA security). The server's PII encryption
//! service derives key and IV the same way and must be able to read what this
//! crate writes, so the scheme is kept exactly as is.
//!
//! - `key = SHA-256(passphrase)`
//! - `iv  = SHA-256(passphrase ++ "IV")[..16]`

use std::fmt;

use sha2::{Digest, Sha256};

use crate::aliases::{Aes256Key32, Iv16, Passphrase};
use crate::consts::{BLOCK_LEN, FINGERPRINT_HEX_LEN, IV_SUFFIX, KEY_LEN};
use crate::core::util::blake3_hex;

/// Derived `{key, iv}` pair. Lives in memory only; zeroized on drop.
pub struct KeyMaterial {
    key: Aes256Key32,
    iv: Iv16,
}

/// Derive key material from a passphrase string
pub fn derive(passphrase: &str) -> KeyMaterial {
    let key: [u8; KEY_LEN] = Sha256::digest(passphrase.as_bytes()).into();

    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.update(IV_SUFFIX.as_bytes());
    let iv_hash: [u8; 32] = hasher.finalize().into();

    let mut iv = [0u8; BLOCK_LEN];
    iv.copy_from_slice(&iv_hash[..BLOCK_LEN]);

    KeyMaterial {
        key: Aes256Key32::new(key),
        iv: Iv16::new(iv),
    }
}

impl KeyMaterial {
    pub fn from_passphrase(passphrase: &Passphrase) -> Self {
        derive(passphrase.expose_secret())
    }

    #[inline]
    pub fn key(&self) -> &[u8; KEY_LEN] {
        self.key.expose_secret()
    }

    #[inline]
    pub fn iv(&self) -> &[u8; BLOCK_LEN] {
        self.iv.expose_secret()
    }

    /// Short BLAKE3 fingerprint of key ++ iv.
    ///
    /// Lets an operator check two environments share a passphrase without
    /// printing it. Reveals nothing usable about the key.
    pub fn fingerprint(&self) -> String {
        let mut material = Vec::with_capacity(KEY_LEN + BLOCK_LEN);
        material.extend_from_slice(self.key());
        material.extend_from_slice(self.iv());
        let mut hex = blake3_hex(&material);
        hex.truncate(FINGERPRINT_HEX_LEN);
        hex
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}
