//! Clinician Notes
//!
//! Free-text annotations a clinician records while reviewing the views.
//!
//! - **store**: the append-only [`NoteLog`], CSV export and reload
//! - **pdf**: paginated PDF export

mod pdf;
mod store;

pub use pdf::PdfOptions;
pub use store::{Note, NoteLog, CSV_HEADER};

use crate::config::NotesConfig;

impl From<&NotesConfig> for PdfOptions {
    fn from(config: &NotesConfig) -> Self {
        Self {
            title: config.pdf_title.clone(),
            lines_per_page: config.lines_per_page,
        }
    }
}

/// Errors that can occur while storing or exporting notes
#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid note store: {0}")]
    InvalidStore(String),
}
