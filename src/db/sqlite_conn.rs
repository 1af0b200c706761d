// src/db/sqlite_conn.rs
//! SQLite backend — rehearsal runs against a local copy, and the test suite

use std::path::Path;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OpenFlags, ToSql, Transaction};

use super::{FieldRecord, FieldStore, RowId, TableBatch, TargetSql};
use crate::error::{CoreError, Result};
use crate::migrate::target::Target;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open an existing database file read-write. Never creates one: a
    /// missing file is a connection error, not an empty database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| CoreError::Connection(format!("{}: {e}", path.display())))?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

impl FieldStore for SqliteStore {
    fn begin<'a>(&'a mut self, target: &Target) -> Result<Box<dyn TableBatch + 'a>> {
        let tx = self.conn.transaction()?;
        Ok(Box::new(SqliteBatch {
            tx,
            sql: TargetSql::new(target, quote),
            table: target.table().to_string(),
        }))
    }
}

struct SqliteBatch<'a> {
    tx: Transaction<'a>,
    sql: TargetSql,
    table: String,
}

fn row_id_from_value(value: ValueRef<'_>) -> RowId {
    match value {
        ValueRef::Integer(id) => RowId::Int(id),
        ValueRef::Text(id) | ValueRef::Blob(id) => {
            RowId::Text(String::from_utf8_lossy(id).into_owned())
        }
        other => RowId::Text(format!("{other:?}")),
    }
}

/// Raw stored bytes. Text and blobs are copied untouched; numbers are
/// rendered the way SQLite prints them.
fn bytes_from_value(value: ValueRef<'_>) -> Option<Vec<u8>> {
    match value {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
        ValueRef::Integer(n) => Some(n.to_string().into_bytes()),
        ValueRef::Real(n) => Some(n.to_string().into_bytes()),
    }
}

impl ToSql for RowId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            RowId::Int(id) => ToSqlOutput::from(*id),
            RowId::Text(id) => ToSqlOutput::from(id.as_str()),
        })
    }
}

impl TableBatch for SqliteBatch<'_> {
    fn fetch(&mut self) -> Result<Vec<FieldRecord>> {
        let mut stmt = self.tx.prepare(&self.sql.select)?;
        let rows = stmt.query_map([], |row| {
            Ok(FieldRecord::new(
                row_id_from_value(row.get_ref(0)?),
                bytes_from_value(row.get_ref(1)?),
            ))
        })?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn update(&mut self, row_id: &RowId, ciphertext: &str) -> Result<()> {
        let changed = self
            .tx
            .prepare_cached(&self.sql.update)?
            .execute(params![ciphertext, row_id])?;
        if changed == 0 {
            return Err(CoreError::RowMissing {
                table: self.table.clone(),
                row: row_id.to_string(),
            });
        }
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let batch = *self;
        batch.tx.commit()?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        let batch = *self;
        batch.tx.rollback()?;
        Ok(())
    }
}
