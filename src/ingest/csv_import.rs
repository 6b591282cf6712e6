//! CSV Import
//!
//! Reads a delimited behavioral log into raw rows keyed by header name.
//! Rows are not interpreted here; see [`super::Normalizer`].

use super::normalizer::RawRow;
use super::IngestError;
use crate::config::{ColumnsConfig, IngestConfig};
use std::io::Read;
use std::path::Path;

/// CSV log reader with configurable delimiter
pub struct CsvImporter {
    /// Field delimiter byte
    delimiter: u8,
    /// Columns that must be present in the header
    required_columns: Vec<String>,
}

/// Result of a CSV import operation
#[derive(Debug)]
pub struct CsvImportResult {
    pub rows: Vec<RawRow>,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvImporter {
    /// Create a new CSV importer with default settings
    pub fn new() -> Self {
        let columns = ColumnsConfig::default();
        Self {
            delimiter: b',',
            required_columns: vec![columns.date, columns.kind],
        }
    }

    /// Build an importer from configuration
    pub fn from_config(columns: &ColumnsConfig, ingest: &IngestConfig) -> Result<Self, IngestError> {
        Ok(Self {
            delimiter: ingest.delimiter_byte()?,
            required_columns: vec![columns.date.clone(), columns.kind.clone()],
        })
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Import rows from a CSV file
    pub fn import(&self, path: &Path) -> Result<CsvImportResult, IngestError> {
        let file = std::fs::File::open(path)?;
        tracing::debug!(path = %path.display(), "Reading behavioral log");
        self.import_reader(file)
    }

    /// Import from a CSV string (useful for testing)
    pub fn import_str(&self, csv_data: &str) -> Result<CsvImportResult, IngestError> {
        self.import_reader(csv_data.as_bytes())
    }

    /// Import from any reader
    pub fn import_reader<R: Read>(&self, source: R) -> Result<CsvImportResult, IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        for required in &self.required_columns {
            if !headers.iter().any(|h| h == required) {
                return Err(IngestError::MissingColumn(required.clone()));
            }
        }

        let mut rows = Vec::new();
        let mut rows_failed = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.records().enumerate() {
            // Header is line 1
            let actual_line = line_num + 2;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(format!("Line {}: {}", actual_line, e));
                    rows_failed += 1;
                    continue;
                }
            };

            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            rows.push(row);
        }

        // Truncate errors if too many
        if errors.len() > 100 {
            let total = errors.len();
            errors.truncate(100);
            errors.push(format!("... and {} more errors", total - 100));
        }

        tracing::info!(rows = rows.len(), failed = rows_failed, "Imported CSV log");

        Ok(CsvImportResult {
            rows,
            rows_failed,
            errors,
        })
    }
}
