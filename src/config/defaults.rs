// src/config/defaults.rs
use crate::aliases::Passphrase;
use crate::consts::{DEFAULT_MYSQL_PORT, FALLBACK_PASSPHRASE};

/// Connection-string keys accepted for each field, compared lowercase
pub const HOST_KEYS: &[&str] = &["server", "host"];
pub const PORT_KEYS: &[&str] = &["port"];
pub const USER_KEYS: &[&str] = &["user", "user id", "uid"];
pub const PASSWORD_KEYS: &[&str] = &["password", "pwd"];
pub const DATABASE_KEYS: &[&str] = &["database"];

pub fn default_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

pub fn fallback_passphrase() -> Passphrase {
    Passphrase::new(FALLBACK_PASSPHRASE.to_string())
}
