// src/lib.rs
//! pii-migrate — encrypts plaintext PII columns in place
//!
//! Features:
//! - Passphrase-derived AES-256-CBC, byte-compatible with the server's PII encryption service
//! - Plaintext / ciphertext detection from value shape, cross-checked against the key
//! - One transaction per table; row failures never abort a table
//! - SQLite rehearsal backend, MySQL production backend (`mysql` feature)

pub mod aliases;
pub mod config;
pub mod consts;
pub mod core;
pub mod db;
pub mod error;
pub mod migrate;

// Re-export everything users need at the crate root
pub use crate::config::{ConnectionSettings, Settings};
pub use crate::core::{derive, FieldKind, KeyMaterial, Verdict};
pub use crate::error::{ConfigError, CoreError, FieldError, Result as CoreResult};
pub use crate::migrate::{MigrationReport, MigrationRunner, MigrationStats, Target, TargetSet};
