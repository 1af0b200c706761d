//! Small utility functions used across the core module
//!
//! Hashing helpers and SQL identifier checks.
//! Keep this light — if it grows, split further.

use blake3::Hasher;

/// Compute BLAKE3 hash and return as lowercase hex string
pub fn blake3_hex(data: &[u8]) -> String {
    Hasher::new().update(data).finalize().to_hex().to_string()
}

/// True for plain SQL identifiers: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
