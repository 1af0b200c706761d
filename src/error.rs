// src/error.rs
//! Public error types for the entire crate

use std::path::PathBuf;

use thiserror::Error;

/// Fatal setup problems with the settings document.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no connection string found under ConnectionStrings:MySQL or ConnectionStrings:DefaultConnection")]
    MissingConnectionString,

    #[error("connection string is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("connection string has an invalid port: {0:?}")]
    InvalidPort(String),

    #[error("invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Per-field encryption / decryption failures. Never fatal to a table.
///
/// Variants never carry field values; those are PII.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("value is not a YYYY-MM-DD date: {0}")]
    InvalidDate(#[source] chrono::ParseError),

    #[error("refusing to encrypt an empty value")]
    Empty,

    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    CiphertextLength(usize),

    #[error("ciphertext padding is invalid (wrong key or not ciphertext)")]
    Padding,

    #[error("decrypted value is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("stored value is not UTF-8: {0}")]
    StoredNotUtf8(#[source] std::str::Utf8Error),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    Mysql(#[from] mysql::Error),

    #[error("cannot connect to database: {0}")]
    Connection(String),

    #[error("update of {table} row {row} matched no rows")]
    RowMissing { table: String, row: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
