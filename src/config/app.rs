// src/config/app.rs
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::connection::{parse_connection_string, ConnectionSettings};
use super::defaults::fallback_passphrase;
use crate::aliases::Passphrase;
use crate::error::ConfigError;

/// The slice of the server's settings document a migration needs.
///
/// Unknown sections are ignored, so the production file can be passed as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(rename = "PiiEncryption", default)]
    pub pii_encryption: KeySection,

    #[serde(rename = "Encryption", default)]
    pub encryption: KeySection,

    #[serde(rename = "ConnectionStrings", default)]
    pub connection_strings: ConnectionStrings,
}

#[derive(Clone, Default, Deserialize)]
pub struct KeySection {
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
}

impl fmt::Debug for KeySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySection")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct ConnectionStrings {
    #[serde(rename = "MySQL", default)]
    pub mysql: Option<String>,

    #[serde(rename = "DefaultConnection", default)]
    pub default_connection: Option<String>,
}

impl fmt::Debug for ConnectionStrings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connection strings embed the database password
        f.debug_struct("ConnectionStrings")
            .field("mysql", &self.mysql.as_ref().map(|_| "<redacted>"))
            .field(
                "default_connection",
                &self.default_connection.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Where the passphrase in use came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassphraseSource {
    /// `PiiEncryption:Key`
    PiiEncryption,
    /// `Encryption:Key`
    Encryption,
    /// Neither key set, so the hardcoded fallback
    Fallback,
}

impl fmt::Display for PassphraseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassphraseSource::PiiEncryption => f.write_str("PiiEncryption:Key"),
            PassphraseSource::Encryption => f.write_str("Encryption:Key"),
            PassphraseSource::Fallback => f.write_str("built-in fallback passphrase"),
        }
    }
}

/// A passphrase is used verbatim; only a missing or empty key is unset
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Read and parse the settings document at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn passphrase_source(&self) -> PassphraseSource {
        if non_empty(&self.pii_encryption.key).is_some() {
            PassphraseSource::PiiEncryption
        } else if non_empty(&self.encryption.key).is_some() {
            PassphraseSource::Encryption
        } else {
            PassphraseSource::Fallback
        }
    }

    /// Resolve the passphrase: `PiiEncryption:Key`, then `Encryption:Key`,
    /// then the fallback. Empty values count as unset; anything else,
    /// whitespace included, is the passphrase exactly as written.
    pub fn passphrase(&self) -> Passphrase {
        non_empty(&self.pii_encryption.key)
            .or_else(|| non_empty(&self.encryption.key))
            .map(|key| Passphrase::new(key.to_string()))
            .unwrap_or_else(fallback_passphrase)
    }

    /// Raw connection string, `MySQL` before `DefaultConnection`
    pub fn connection_string(&self) -> Result<&str, ConfigError> {
        non_blank(&self.connection_strings.mysql)
            .or_else(|| non_blank(&self.connection_strings.default_connection))
            .ok_or(ConfigError::MissingConnectionString)
    }

    pub fn connection(&self) -> Result<ConnectionSettings, ConfigError> {
        parse_connection_string(self.connection_string()?)
    }
}
