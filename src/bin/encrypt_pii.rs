// src/bin/encrypt_pii.rs
//! Encrypt plaintext DateOfBirth / MobilePhone columns in place

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pii_migrate::config::PassphraseSource;
use pii_migrate::core::{PhoneFormat, ProbingClassifier};
use pii_migrate::db::{self, FieldStore, SqliteStore};
use pii_migrate::{KeyMaterial, MigrationReport, MigrationRunner, Settings, TargetSet};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Exit code for `--strict` runs that completed with row errors or rollbacks
const EXIT_COMPLETED_WITH_FAILURES: u8 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fields {
    Dob,
    Phone,
    All,
}

impl From<Fields> for TargetSet {
    fn from(fields: Fields) -> Self {
        match fields {
            Fields::Dob => TargetSet::DateOfBirth,
            Fields::Phone => TargetSet::MobilePhone,
            Fields::All => TargetSet::All,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "encrypt_pii", version, about)]
struct Cli {
    /// Path to the server's appsettings.Production.json
    #[arg(env = "PII_MIGRATE_CONFIG")]
    config: PathBuf,

    /// Which PII columns to migrate
    #[arg(long, value_enum, default_value_t = Fields::All)]
    fields: Fields,

    /// Run against a local SQLite copy instead of the configured MySQL server
    #[arg(long, value_name = "PATH")]
    sqlite: Option<PathBuf>,

    /// Classify and encrypt, but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Exit non-zero if any row failed or any table rolled back
    #[arg(long)]
    strict: bool,

    /// Leave phone values that already decrypt under the key untouched,
    /// even when their shape says plaintext
    #[arg(long)]
    confirm_with_key: bool,

    /// Strip phone numbers to `+` and digits before encrypting
    #[arg(long)]
    normalize_phone: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(report) if cli.strict && report.has_failures() => {
            ExitCode::from(EXIT_COMPLETED_WITH_FAILURES)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<MigrationReport> {
    banner("PII Field Encryption");
    if cli.dry_run {
        println!("(dry run: nothing will be written)");
    }
    println!();

    println!("Step 1: Loading encryption key and IV...");
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;
    let source = settings.passphrase_source();
    if source == PassphraseSource::Fallback {
        warn!("no PiiEncryption:Key or Encryption:Key configured, using the built-in fallback passphrase");
    }
    let key = KeyMaterial::from_passphrase(&settings.passphrase());
    println!(
        "✅ Encryption key loaded (length: {} bytes, from {source})",
        key.key().len()
    );
    println!("✅ IV loaded (length: {} bytes)", key.iv().len());
    println!("   Key fingerprint: {}", key.fingerprint());
    println!();

    println!("Step 2: Connecting to database...");
    let mut store = open_store(cli, &settings)?;
    println!("✅ Database connection established");
    println!();

    let classifier = ProbingClassifier::new(&key).confirm_with_key(cli.confirm_with_key);
    let phone_format = if cli.normalize_phone {
        PhoneFormat::DigitsOnly
    } else {
        PhoneFormat::AsStored
    };
    let runner = MigrationRunner::new(&key, &classifier)
        .with_phone_format(phone_format)
        .dry_run(cli.dry_run);

    let mut tables = Vec::new();
    for (step, target) in TargetSet::from(cli.fields).targets().iter().enumerate() {
        println!("Step {}: Encrypting {target}...", step + 3);
        let report = runner.migrate_table(store.as_mut(), target);
        println!("{}", report.summary_line());
        println!();
        tables.push(report);
    }
    let report = MigrationReport::new(tables);

    let totals = report.totals();
    if totals.ambiguous > 0 {
        println!(
            "⚠️  {} row(s) where the shape rules and the key disagree; see the log for row ids",
            totals.ambiguous
        );
    }
    banner(if report.has_failures() {
        "⚠️  Encryption completed with errors"
    } else {
        "✅ Encryption completed!"
    });

    Ok(report)
}

fn open_store(cli: &Cli, settings: &Settings) -> Result<Box<dyn FieldStore>> {
    if let Some(path) = &cli.sqlite {
        let store = SqliteStore::open(path).context("database connection failed")?;
        println!("✅ Opened SQLite copy {}", path.display());
        return Ok(Box::new(store));
    }

    let connection = settings
        .connection()
        .context("invalid database connection string")?;
    println!("   Connecting to {}", connection.display_target());
    db::connect(&connection).context("database connection failed")
}

fn banner(title: &str) {
    println!("{}", "=".repeat(50));
    println!("{title}");
    println!("{}", "=".repeat(50));
}
