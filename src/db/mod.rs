// src/db/mod.rs
//! Database access for a migration run
//!
//! The runner only sees [`FieldStore`] and [`TableBatch`]. One store wraps the
//! single connection for the whole run; one batch wraps one table's
//! transaction.

use std::fmt;

use crate::error::{FieldError, Result};
use crate::migrate::target::Target;

#[cfg(feature = "mysql")]
pub mod mysql_conn;
pub mod sqlite_conn;

#[cfg(feature = "mysql")]
pub use mysql_conn::MysqlStore;
pub use sqlite_conn::SqliteStore;

/// Primary key of a migrated row. Integer in practice, opaque otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{id}"),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

/// One candidate row's value for the target column, as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    pub row_id: RowId,
    pub raw_value: Option<Vec<u8>>,
}

impl FieldRecord {
    pub fn new(row_id: RowId, raw_value: Option<Vec<u8>>) -> Self {
        Self { row_id, raw_value }
    }

    /// The stored value as text. Bytes that are not UTF-8 are an error,
    /// never a lossy conversion: the row must be left exactly as it is.
    pub fn text(&self) -> std::result::Result<Option<&str>, FieldError> {
        self.raw_value
            .as_deref()
            .map(std::str::from_utf8)
            .transpose()
            .map_err(FieldError::StoredNotUtf8)
    }
}

pub trait FieldStore {
    /// Open the transaction that bounds one table's writes
    fn begin<'a>(&'a mut self, target: &Target) -> Result<Box<dyn TableBatch + 'a>>;
}

/// One table's transaction. Dropping it without committing rolls back.
pub trait TableBatch {
    /// Every row whose target column is not NULL, ordered by id
    fn fetch(&mut self) -> Result<Vec<FieldRecord>>;

    /// Overwrite one row's column. A missing row is an error.
    fn update(&mut self, row_id: &RowId, ciphertext: &str) -> Result<()>;

    fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>) -> Result<()>;
}

/// SQL statements for one target, with identifiers quoted by `quote`
pub(crate) struct TargetSql {
    pub select: String,
    pub update: String,
}

impl TargetSql {
    pub(crate) fn new(target: &Target, quote: fn(&str) -> String) -> Self {
        let table = quote(target.table());
        let id = quote(target.id_column());
        let column = quote(target.column());
        Self {
            select: format!(
                "SELECT {id}, {column} FROM {table} WHERE {column} IS NOT NULL ORDER BY {id}"
            ),
            update: format!("UPDATE {table} SET {column} = ? WHERE {id} = ?"),
        }
    }
}

/// Connect to the production database described by the settings document
#[cfg(feature = "mysql")]
pub fn connect(settings: &crate::config::ConnectionSettings) -> Result<Box<dyn FieldStore>> {
    Ok(Box::new(MysqlStore::connect(settings)?))
}

#[cfg(not(feature = "mysql"))]
pub fn connect(settings: &crate::config::ConnectionSettings) -> Result<Box<dyn FieldStore>> {
    Err(crate::error::CoreError::Connection(format!(
        "cannot reach {}: built without the `mysql` feature (rebuild with it, or rehearse with --sqlite)",
        settings.display_target()
    )))
}
