//! Log Ingestion
//!
//! This module turns an uploaded behavioral log into a typed event table:
//!
//! - **csv_import**: delimited file → raw rows (column name → cell text)
//! - **normalizer**: raw rows → strict [`Event`]s
//! - **types**: the event model and [`EventTable`]
//!
//! # Flow
//!
//! ```text
//!   CSV file → CsvImporter → Vec<RawRow> → Normalizer → EventTable
//! ```

mod csv_import;
mod normalizer;
mod types;

pub use csv_import::{CsvImportResult, CsvImporter};
pub use normalizer::{Normalizer, RawRow};
pub use types::{Event, EventKind, EventTable, EventTime, NormalizeReport};

use crate::config::{Config, ConfigError};
use std::path::Path;

/// Errors that can occur while reading a log
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Read and normalize a CSV log in one step
pub fn load_log(path: &Path, config: &Config) -> Result<(EventTable, NormalizeReport), IngestError> {
    let importer = CsvImporter::from_config(&config.columns, &config.ingest)?;
    let imported = importer.import(path)?;

    for error in imported.errors.iter().take(10) {
        tracing::warn!("{}", error);
    }

    let normalizer = Normalizer::new(config.columns.clone(), &config.ingest);
    let (table, report) = normalizer.normalize(&imported.rows);
    tracing::info!(%report, "Normalized log");

    Ok((table, report))
}
