// src/aliases.rs
//! Secret-holding buffer types built on secure-gate
//!
//! Everything derived from the passphrase lives in one of these and is
//! zeroized on drop. Access always goes through `.expose_secret()`.

use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(Aes256Key32, 32); // AES-256 key, SHA-256 of the passphrase
fixed_alias!(Iv16, 16); // CBC IV, first half of SHA-256(passphrase ++ "IV")

// Dynamic secrets
dynamic_alias!(Passphrase, String); // Shared passphrase from the settings document
