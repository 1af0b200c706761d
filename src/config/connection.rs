// src/config/connection.rs
//! `key=value;key=value` connection strings, as the server's MySQL driver reads them

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::defaults::{
    default_port, DATABASE_KEYS, HOST_KEYS, PASSWORD_KEYS, PORT_KEYS, USER_KEYS,
};
use crate::error::ConfigError;

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionSettings {
    /// `host:port/database`, safe to print
    pub fn display_target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl FromStr for ConnectionSettings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_connection_string(s)
    }
}

/// Parse a `;`-separated connection string.
///
/// Keys are case-insensitive and trimmed, the first `=` splits key from value,
/// and segments without `=` are ignored. A later duplicate key wins.
pub fn parse_connection_string(raw: &str) -> Result<ConnectionSettings, ConfigError> {
    let parts: HashMap<String, String> = raw
        .split(';')
        .filter_map(|segment| segment.split_once('='))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let lookup = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .filter_map(|k| parts.get(*k))
            .find(|v| !v.is_empty())
            .cloned()
    };

    let port = match lookup(PORT_KEYS) {
        Some(port) => port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?,
        None => default_port(),
    };

    Ok(ConnectionSettings {
        host: lookup(HOST_KEYS).ok_or(ConfigError::MissingField("server"))?,
        port,
        user: lookup(USER_KEYS).ok_or(ConfigError::MissingField("user"))?,
        password: lookup(PASSWORD_KEYS).unwrap_or_default(),
        database: lookup(DATABASE_KEYS).ok_or(ConfigError::MissingField("database"))?,
    })
}
