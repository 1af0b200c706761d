// src/migrate/runner.rs
//! Table-by-table migration: fetch → classify → encrypt → persist → commit
//!
//! Strictly sequential. Row failures are counted and skipped; only a failure
//! to open, fetch or commit a table's batch ends that table, and the next
//! table is still attempted.

use tracing::{debug, error, info, warn};

use crate::core::classify::{FieldClassifier, Verdict};
use crate::core::field::{FieldEncryptor, PhoneFormat};
use crate::core::key::KeyMaterial;
use crate::db::{FieldRecord, FieldStore, TableBatch};
use crate::migrate::stats::{MigrationReport, MigrationStats, Phase, TableOutcome, TableReport};
use crate::migrate::target::Target;

pub struct MigrationRunner<'a> {
    encryptor: FieldEncryptor<'a>,
    classifier: &'a dyn FieldClassifier,
    dry_run: bool,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(key: &'a KeyMaterial, classifier: &'a dyn FieldClassifier) -> Self {
        Self {
            encryptor: FieldEncryptor::new(key),
            classifier,
            dry_run: false,
        }
    }

    pub fn with_phone_format(mut self, phone_format: PhoneFormat) -> Self {
        self.encryptor = self.encryptor.with_phone_format(phone_format);
        self
    }

    /// Classify and encrypt without writing anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Migrate every target in order, each in its own transaction
    pub fn run(&self, store: &mut dyn FieldStore, targets: &[Target]) -> MigrationReport {
        targets
            .iter()
            .map(|target| self.migrate_table(store, target))
            .collect()
    }

    pub fn migrate_table(&self, store: &mut dyn FieldStore, target: &Target) -> TableReport {
        let mut stats = MigrationStats::default();
        info!(%target, dry_run = self.dry_run, "migrating table");

        let mut batch = match store.begin(target) {
            Ok(batch) => batch,
            Err(e) => return failed(target, stats, Phase::Fetching, e),
        };
        let records = match batch.fetch() {
            Ok(records) => records,
            Err(e) => return failed(target, stats, Phase::Fetching, e),
        };
        debug!(%target, rows = records.len(), "fetched candidate rows");

        for record in &records {
            self.process_row(batch.as_mut(), target, record, &mut stats);
        }

        if self.dry_run {
            return match batch.rollback() {
                Ok(()) => report(target, stats, TableOutcome::DryRun),
                Err(e) => failed(target, stats, Phase::RollingBack, e),
            };
        }

        match batch.commit() {
            Ok(()) => {
                stats.encrypted = stats.staged;
                info!(%target, encrypted = stats.encrypted, skipped = stats.skipped(), errors = stats.errors, "table committed");
                report(target, stats, TableOutcome::Committed)
            }
            Err(e) => {
                error!(%target, phase = %Phase::Committing, staged = stats.staged, error = %e, "commit failed; table rolled back");
                report(
                    target,
                    stats,
                    TableOutcome::RolledBack {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    fn process_row(
        &self,
        batch: &mut dyn TableBatch,
        target: &Target,
        record: &FieldRecord,
        stats: &mut MigrationStats,
    ) {
        let row = &record.row_id;
        let raw = match record.text() {
            Ok(raw) => raw,
            Err(e) => {
                stats.errors += 1;
                warn!(%target, %row, phase = %Phase::Classifying, error = %e, "row left untouched");
                return;
            }
        };
        let classification = self.classifier.assess(raw, target.kind());
        if classification.suspect {
            stats.ambiguous += 1;
            warn!(%target, %row, verdict = ?classification.verdict, "value shape and key probe disagree; review this row");
        }

        let raw = match (classification.verdict, raw) {
            (Verdict::Plaintext, Some(raw)) => raw,
            (Verdict::AlreadyEncrypted, _) => {
                stats.already_encrypted += 1;
                return;
            }
            _ => {
                stats.blank += 1;
                return;
            }
        };

        let ciphertext = match self.encryptor.encrypt(raw, target.kind()) {
            Ok(ciphertext) => ciphertext,
            Err(e) => {
                stats.errors += 1;
                warn!(%target, %row, phase = %Phase::Encrypting, error = %e, "row not encrypted");
                return;
            }
        };

        if self.dry_run {
            stats.staged += 1;
            return;
        }

        match batch.update(row, &ciphertext) {
            Ok(()) => {
                stats.staged += 1;
                debug!(%target, %row, "row encrypted");
            }
            Err(e) => {
                stats.errors += 1;
                warn!(%target, %row, phase = %Phase::Persisting, error = %e, "row not written");
            }
        }
    }
}

fn report(target: &Target, stats: MigrationStats, outcome: TableOutcome) -> TableReport {
    TableReport {
        target: target.clone(),
        stats,
        outcome,
    }
}

fn failed(
    target: &Target,
    stats: MigrationStats,
    phase: Phase,
    err: impl std::fmt::Display,
) -> TableReport {
    error!(%target, %phase, error = %err, "table failed");
    report(
        target,
        stats,
        TableOutcome::Failed {
            phase,
            reason: err.to_string(),
        },
    )
}
