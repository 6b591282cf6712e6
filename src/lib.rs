//! # Affectrum
//!
//! Behavioral log analysis for clinicians: mood trends, mood vs. substance
//! and activity, and mood vs. sleep duration, derived from a single
//! time-stamped CSV log.
//!
//! ## Modules
//!
//! - [`ingest`]: CSV import and normalization into typed events
//! - [`analysis`]: sleep sessions, same-day correlation and derived views
//! - [`notes`]: append-only clinician notes with CSV and PDF export
//! - [`output`]: table / JSON / CSV rendering for the command line
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use affectrum::{Analyzer, Config, CorrelationQuery};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let (table, report) = affectrum::ingest::load_log(Path::new("log.csv"), &config)?;
//!     println!("{}", report);
//!
//!     let analyzer = Analyzer::new(table, &config.sleep);
//!     let views = analyzer.analyze(&CorrelationQuery::new().substance("Coffee"));
//!
//!     for row in &views.mood_sleep {
//!         println!("{} mood={} sleep={:?}", row.timestamp, row.mood_value, row.sleep_hours);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod notes;
pub mod output;

// Re-export top-level types for convenience
pub use analysis::{
    Analyzer, CorrelationQuery, DayIndex, DerivedViews, MoodRecord, SameDayCorrelator,
    SessionReconstructor, SessionReport, SleepSession,
};

pub use ingest::{
    CsvImporter, Event, EventKind, EventTable, EventTime, IngestError, NormalizeReport,
    Normalizer, RawRow,
};

pub use notes::{Note, NoteLog, NotesError, PdfOptions};

pub use output::{OutputFormat, ViewSelection};

pub use config::{Config, ConfigError, LoggingConfig};
