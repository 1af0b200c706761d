// src/db/mysql_conn.rs
//! MySQL backend — the production database

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Transaction, TxOpts, Value};

use super::{FieldRecord, FieldStore, RowId, TableBatch, TargetSql};
use crate::config::ConnectionSettings;
use crate::error::{CoreError, Result};
use crate::migrate::target::Target;

pub struct MysqlStore {
    conn: Conn,
}

impl MysqlStore {
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(settings.host.clone()))
            .tcp_port(settings.port)
            .user(Some(settings.user.clone()))
            .pass(Some(settings.password.clone()))
            .db_name(Some(settings.database.clone()))
            .init(vec!["SET NAMES utf8mb4".to_string()]);
        let conn = Conn::new(opts).map_err(|e| {
            CoreError::Connection(format!("{}: {e}", settings.display_target()))
        })?;
        Ok(Self { conn })
    }
}

fn quote(ident: &str) -> String {
    format!("`{ident}`")
}

fn row_id_from_value(value: Value) -> RowId {
    match value {
        Value::Int(id) => RowId::Int(id),
        Value::UInt(id) => i64::try_from(id)
            .map(RowId::Int)
            .unwrap_or_else(|_| RowId::Text(id.to_string())),
        Value::Bytes(bytes) => RowId::Text(String::from_utf8_lossy(&bytes).into_owned()),
        other => RowId::Text(format!("{other:?}")),
    }
}

/// Raw stored bytes. Text columns arrive as `Bytes` and are kept untouched.
fn bytes_from_value(value: Value) -> Option<Vec<u8>> {
    match value {
        Value::NULL => None,
        Value::Bytes(bytes) => Some(bytes),
        Value::Int(n) => Some(n.to_string().into_bytes()),
        Value::UInt(n) => Some(n.to_string().into_bytes()),
        Value::Float(n) => Some(n.to_string().into_bytes()),
        Value::Double(n) => Some(n.to_string().into_bytes()),
        Value::Date(y, m, d, h, mi, s, us) => Some(
            format!("{y:04}-{m:02}-{d:02}T{h:02}:{mi:02}:{s:02}.{us:06}").into_bytes(),
        ),
        other => Some(format!("{other:?}").into_bytes()),
    }
}

fn row_id_to_value(row_id: &RowId) -> Value {
    match row_id {
        RowId::Int(id) => Value::Int(*id),
        RowId::Text(id) => Value::Bytes(id.clone().into_bytes()),
    }
}

impl FieldStore for MysqlStore {
    fn begin<'a>(&'a mut self, target: &Target) -> Result<Box<dyn TableBatch + 'a>> {
        let tx = self.conn.start_transaction(TxOpts::default())?;
        Ok(Box::new(MysqlBatch {
            tx,
            sql: TargetSql::new(target, quote),
            table: target.table().to_string(),
        }))
    }
}

struct MysqlBatch<'a> {
    tx: Transaction<'a>,
    sql: TargetSql,
    table: String,
}

impl TableBatch for MysqlBatch<'_> {
    fn fetch(&mut self) -> Result<Vec<FieldRecord>> {
        // `Value` never fails conversion, so odd bytes reach the runner intact
        let rows: Vec<(Value, Value)> = self.tx.query(self.sql.select.as_str())?;
        Ok(rows
            .into_iter()
            .map(|(id, raw)| FieldRecord::new(row_id_from_value(id), bytes_from_value(raw)))
            .collect())
    }

    fn update(&mut self, row_id: &RowId, ciphertext: &str) -> Result<()> {
        self.tx.exec_drop(
            self.sql.update.as_str(),
            (ciphertext, row_id_to_value(row_id)),
        )?;
        if self.tx.affected_rows() == 0 {
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
