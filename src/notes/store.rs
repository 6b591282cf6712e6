//! Append-only clinician note log
//!
//! Notes are (timestamp-string, free-text) pairs. The log only grows: there
//! is no edit or delete, and it is always passed explicitly to whoever
//! appends or exports.

use super::NotesError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Header of the CSV export
pub const CSV_HEADER: [&str; 2] = ["Timestamp", "Note"];

/// A single clinician note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Note")]
    pub text: String,
}

/// Append-only collection of notes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteLog {
    notes: Vec<Note>,
}

impl NoteLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note stamped with `date` as `%Y-%m-%d`
    pub fn append(&mut self, date: NaiveDate, text: impl Into<String>) -> &Note {
        self.push(Note {
            timestamp: date.format("%Y-%m-%d").to_string(),
            text: text.into(),
        })
    }

    fn push(&mut self, note: Note) -> &Note {
        self.notes.push(note);
        let idx = self.notes.len() - 1;
        &self.notes[idx]
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Write all notes as CSV with a `Timestamp,Note` header
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<(), NotesError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for note in &self.notes {
            csv.write_record([note.timestamp.as_str(), note.text.as_str()])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Read notes previously written by [`NoteLog::export_csv`]
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, NotesError> {
        let mut csv = csv::Reader::from_reader(reader);

        let headers = csv.headers()?.clone();
        if headers.iter().ne(CSV_HEADER) {
            return Err(NotesError::InvalidStore(format!(
                "expected header {:?}, found {:?}",
                CSV_HEADER,
                headers.iter().collect::<Vec<_>>()
            )));
        }

        let mut log = Self::new();
        for record in csv.deserialize::<Note>() {
            log.push(record?);
        }
        Ok(log)
    }

    /// Load the note store, or start empty when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, NotesError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No note store yet");
            return Ok(Self::new());
        }
        let file = std::fs::File::open(path)?;
        Self::from_csv(file)
    }

    /// Persist the whole log to `path`
    pub fn save(&self, path: &Path) -> Result<(), NotesError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.export_csv(file)?;
        tracing::debug!(path = %path.display(), notes = self.len(), "Saved note store");
        Ok(())
    }
}
