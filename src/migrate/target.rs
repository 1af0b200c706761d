// src/migrate/target.rs
//! Which table columns a run migrates

use std::fmt;

use crate::consts::{
    DATE_OF_BIRTH_COLUMN, DATE_OF_BIRTH_TABLES, DEFAULT_ID_COLUMN, MOBILE_PHONE_COLUMN,
    MOBILE_PHONE_TABLES,
};
use crate::core::field::FieldKind;
use crate::core::util::is_sql_identifier;
use crate::error::ConfigError;

/// One table + text column holding a single kind of PII field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    table: String,
    id_column: String,
    column: String,
    kind: FieldKind,
}

impl Target {
    /// Build a target from caller-supplied names. Every name must be a plain
    /// SQL identifier, since they are spliced into statements.
    pub fn new(
        table: &str,
        id_column: &str,
        column: &str,
        kind: FieldKind,
    ) -> Result<Self, ConfigError> {
        for name in [table, id_column, column] {
            if !is_sql_identifier(name) {
                return Err(ConfigError::InvalidIdentifier(name.to_string()));
            }
        }
        Ok(Self::builtin(table, id_column, column, kind))
    }

    fn builtin(table: &str, id_column: &str, column: &str, kind: FieldKind) -> Self {
        Self {
            table: table.to_string(),
            id_column: id_column.to_string(),
            column: column.to_string(),
            kind,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Field kinds selectable for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSet {
    DateOfBirth,
    MobilePhone,
    #[default]
    All,
}

impl TargetSet {
    /// The production tables for this selection, in processing order
    pub fn targets(self) -> Vec<Target> {
        let dob = || {
            DATE_OF_BIRTH_TABLES.iter().map(|table| {
                Target::builtin(table, DEFAULT_ID_COLUMN, DATE_OF_BIRTH_COLUMN, FieldKind::DateOfBirth)
            })
        };
        let phone = || {
            MOBILE_PHONE_TABLES.iter().map(|table| {
                Target::builtin(table, DEFAULT_ID_COLUMN, MOBILE_PHONE_COLUMN, FieldKind::MobilePhone)
            })
        };
        match self {
            TargetSet::DateOfBirth => dob().collect(),
            TargetSet::MobilePhone => phone().collect(),
            TargetSet::All => dob().chain(phone()).collect(),
        }
    }
}
