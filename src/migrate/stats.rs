// src/migrate/stats.rs
//! Per-table counters and run reports

use std::fmt;

use crate::migrate::target::Target;

/// Counters for one table. Reset per table, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationStats {
    /// Rows durably rewritten. Only set once the table's batch commits
    pub encrypted: usize,
    /// Rows encrypted and written inside the open batch
    pub staged: usize,
    /// Null, blank or sentinel values
    pub blank: usize,
    pub already_encrypted: usize,
    /// Rows where the shape rules and the key probe disagree
    pub ambiguous: usize,
    pub errors: usize,
}

impl MigrationStats {
    pub fn skipped(&self) -> usize {
        self.blank + self.already_encrypted
    }
}

impl fmt::Display for MigrationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} encrypted, {} skipped, {} errors",
            self.encrypted,
            self.skipped(),
            self.errors
        )?;
        if self.ambiguous > 0 {
            write!(f, ", {} suspect", self.ambiguous)?;
        }
        Ok(())
    }
}

/// Where a table's processing stood when something went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Classifying,
    Encrypting,
    Persisting,
    Committing,
    RollingBack,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fetching => "fetching",
            Phase::Classifying => "classifying",
            Phase::Encrypting => "encrypting",
            Phase::Persisting => "persisting",
            Phase::Committing => "committing",
            Phase::RollingBack => "rolling back",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    Committed,
    /// Nothing written on purpose
    DryRun,
    /// Commit failed; the table is unchanged
    RolledBack { reason: String },
    /// The table could not be processed at all
    Failed { phase: Phase, reason: String },
}

#[derive(Debug, Clone)]
pub struct TableReport {
    pub target: Target,
    pub stats: MigrationStats,
    pub outcome: TableOutcome,
}

impl TableReport {
    pub fn is_clean(&self) -> bool {
        matches!(self.outcome, TableOutcome::Committed | TableOutcome::DryRun)
            && self.stats.errors == 0
    }

    /// One operator-facing line for the run summary
    pub fn summary_line(&self) -> String {
        match &self.outcome {
            TableOutcome::Committed => format!("✅ {}: {}", self.target, self.stats),
            TableOutcome::DryRun => format!(
                "✅ {} (dry run): {} would be encrypted, {} skipped, {} errors",
                self.target,
                self.stats.staged,
                self.stats.skipped(),
                self.stats.errors
            ),
            TableOutcome::RolledBack { reason } => format!(
                "❌ {}: commit failed, {} staged row(s) rolled back: {reason}",
                self.target, self.stats.staged
            ),
            TableOutcome::Failed { phase, reason } => {
                format!("❌ {}: failed while {phase}: {reason}", self.target)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub tables: Vec<TableReport>,
}

impl MigrationReport {
    pub fn new(tables: Vec<TableReport>) -> Self {
        Self { tables }
    }

    /// Any row error, rollback or table failure
    pub fn has_failures(&self) -> bool {
        self.tables.iter().any(|t| !t.is_clean())
    }

    pub fn totals(&self) -> MigrationStats {
        self.tables
            .iter()
            .fold(MigrationStats::default(), |mut acc, t| {
                acc.encrypted += t.stats.encrypted;
                acc.staged += t.stats.staged;
                acc.blank += t.stats.blank;
                acc.already_encrypted += t.stats.already_encrypted;
                acc.ambiguous += t.stats.ambiguous;
                acc.errors += t.stats.errors;
                acc
            })
    }

    pub fn report_for(&self, target: &Target) -> Option<&TableReport> {
        self.tables.iter().find(|t| &t.target == target)
    }
}

impl FromIterator<TableReport> for MigrationReport {
    fn from_iter<I: IntoIterator<Item = TableReport>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
