// src/migrate/mod.rs
pub mod runner;
pub mod stats;
pub mod target;

pub use runner::MigrationRunner;
pub use stats::{MigrationReport, MigrationStats, Phase, TableOutcome, TableReport};
pub use target::{Target, TargetSet};
