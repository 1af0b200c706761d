// tests/support.rs
//! Test utilities — throwaway SQLite copies of the production tables
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use pii_migrate::db::{FieldRecord, FieldStore, RowId, SqliteStore, TableBatch};
use pii_migrate::{CoreError, CoreResult, Target};
use rusqlite::{params, Connection, OptionalExtension};
use tempfile::TempDir;

pub const FALLBACK_KEY_HEX: &str =
    "5c7c716c359d21dc162ec6da96f19fab8c831ea85ee3a8c832686f9e86fdf84d";
pub const FALLBACK_IV_HEX: &str = "b458096a8859b3f847ef0507924916b0";

// Ciphertexts under the fallback passphrase, produced independently of this crate
pub const DOB_2005_02_03: &str = "UVHasOv2TfQh1+9q7Y1BLA==";
pub const DOB_1990_12_31: &str = "kSOCoSdkj+YFzVc1dRQ2oA==";
pub const PHONE_US_FORMATTED: &str = "+1 (555) 123-4567";
pub const PHONE_US_FORMATTED_CT: &str = "mrBDj0UwyNOKwLPyEoJr/TihZjwWXAe9E8p8Ncuc3s4=";
pub const PHONE_UK: &str = "+44 20 7946 0958";
pub const PHONE_UK_CT: &str = "hssqZk5eV69+eiSx0nOVBLe+U71lVG4llLH8Qam8xGg=";
pub const PHONE_SHORT: &str = "5551234567";
pub const PHONE_SHORT_CT: &str = "/5l0qIkOv0Knma4TIIVziQ==";
pub const PHONE_DIGITS_CT: &str = "RWznvtlV17CbVydy6tUDhg==";

pub struct TestDb {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("pii.db");
        let conn = Connection::open(&path).expect("create db");
        conn.execute_batch(
            r#"
            CREATE TABLE Users (
                Id INTEGER PRIMARY KEY,
                DateOfBirthEncrypted TEXT,
                MobilePhoneEncrypted TEXT
            );
            CREATE TABLE UserRequests (
                Id INTEGER PRIMARY KEY,
                DateOfBirthEncrypted TEXT,
                MobilePhoneEncrypted TEXT
            );
            "#,
        )
        .expect("create tables");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&self) -> Connection {
        Connection::open(&self.path).expect("open db")
    }

    pub fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.path).expect("open store")
    }

    pub fn insert(&self, table: &str, id: i64, dob: Option<&str>, phone: Option<&str>) {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO {table} (Id, DateOfBirthEncrypted, MobilePhoneEncrypted) VALUES (?1, ?2, ?3)"
                ),
                params![id, dob, phone],
            )
            .expect("insert row");
    }

    pub fn value(&self, table: &str, column: &str, id: i64) -> Option<String> {
        self.conn()
            .query_row(
                &format!("SELECT {column} FROM {table} WHERE Id = ?1"),
                [id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .expect("select row")
            .flatten()
    }
}

/// Wraps a real store but fails the commit for one target, after rolling it back
pub struct FailingCommitStore {
    pub inner: SqliteStore,
    pub fail_on: Target,
}

impl FieldStore for FailingCommitStore {
    fn begin<'a>(&'a mut self, target: &Target) -> CoreResult<Box<dyn TableBatch + 'a>> {
        let fail = *target == self.fail_on;
        let inner = self.inner.begin(target)?;
        if fail {
            Ok(Box::new(FailingCommitBatch { inner }))
        } else {
            Ok(inner)
        }
    }
}

struct FailingCommitBatch<'a> {
    inner: Box<dyn TableBatch + 'a>,
}

impl TableBatch for FailingCommitBatch<'_> {
    fn fetch(&mut self) -> CoreResult<Vec<FieldRecord>> {
        self.inner.fetch()
    }

    fn update(&mut self, row_id: &RowId, ciphertext: &str) -> CoreResult<()> {
        self.inner.update(row_id, ciphertext)
    }

    fn commit(self: Box<Self>) -> CoreResult<()> {
        let batch = *self;
        batch.inner.rollback()?;
        Err(CoreError::Sql(rusqlite::Error::InvalidQuery))
    }

    fn rollback(self: Box<Self>) -> CoreResult<()> {
        let batch = *self;
        batch.inner.rollback()
    }
}
