//! Core data types for the behavioral log
//!
//! This module defines the normalized representation of one log:
//! - `Event`: a single typed row (mood, substance or activity)
//! - `EventTime`: a parsed timestamp, or the raw text that failed to parse
//! - `EventTable`: the immutable, ordered collection of events
//! - `NormalizeReport`: counters describing what normalization did

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp of an event
///
/// Unparseable timestamps are kept as the original text so the row is not
/// lost, but they never take part in any day-keyed or time-keyed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum EventTime {
    /// Successfully parsed wall-clock time
    At(NaiveDateTime),
    /// Raw cell text that no known format accepted
    Unparsed(String),
}

impl EventTime {
    /// The parsed timestamp, if any
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            EventTime::At(dt) => Some(*dt),
            EventTime::Unparsed(_) => None,
        }
    }

    /// Calendar day of the timestamp, if it parsed
    pub fn day(&self) -> Option<NaiveDate> {
        self.datetime().map(|dt| dt.date())
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, EventTime::At(_))
    }
}

/// Typed payload of an event
///
/// The kind and its value travel together, so a mood row can never carry a
/// substance name. A blank or invalid cell becomes `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum EventKind {
    /// Mood rating (typically 1-10)
    Mood(Option<f64>),
    /// Name of a substance taken
    Substance(Option<String>),
    /// Name of an activity, including the sleep markers
    Activity(Option<String>),
}

impl EventKind {
    /// Short lowercase label, as written in the `Type` column
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Mood(_) => "mood",
            EventKind::Substance(_) => "substance",
            EventKind::Activity(_) => "activity",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One normalized row of the behavioral log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: EventTime,
    pub kind: EventKind,
}

impl Event {
    pub fn new(time: EventTime, kind: EventKind) -> Self {
        Self { time, kind }
    }

    /// Create a mood event at a parsed time
    pub fn mood(at: NaiveDateTime, value: f64) -> Self {
        Self::new(EventTime::At(at), EventKind::Mood(Some(value)))
    }

    /// Create a substance event at a parsed time
    pub fn substance(at: NaiveDateTime, name: impl Into<String>) -> Self {
        Self::new(EventTime::At(at), EventKind::Substance(Some(name.into())))
    }

    /// Create an activity event at a parsed time
    pub fn activity(at: NaiveDateTime, name: impl Into<String>) -> Self {
        Self::new(EventTime::At(at), EventKind::Activity(Some(name.into())))
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.time.datetime()
    }

    /// Calendar day, `None` when the timestamp did not parse
    pub fn day(&self) -> Option<NaiveDate> {
        self.time.day()
    }

    pub fn mood_value(&self) -> Option<f64> {
        match &self.kind {
            EventKind::Mood(value) => *value,
            _ => None,
        }
    }

    pub fn substance_name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Substance(name) => name.as_deref(),
            _ => None,
        }
    }

    pub fn activity_name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Activity(name) => name.as_deref(),
            _ => None,
        }
    }
}

/// Counters produced while normalizing raw rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Raw rows handed to the normalizer
    pub rows_seen: usize,
    /// Events produced (rows with a recognized kind)
    pub events: usize,
    /// Events whose timestamp could not be parsed
    pub unparsed_timestamps: usize,
    /// Rows skipped because the kind column held an unknown value
    pub unknown_kinds: usize,
    /// Events whose value cell was blank or invalid
    pub missing_values: usize,
}

impl std::fmt::Display for NormalizeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows, {} events, {} unparsed timestamps, {} unknown kinds, {} missing values",
            self.rows_seen,
            self.events,
            self.unparsed_timestamps,
            self.unknown_kinds,
            self.missing_values
        )
    }
}

/// Immutable, input-ordered table of normalized events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First and last calendar day over all events with a parsed timestamp
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut days = self.events.iter().filter_map(Event::day);
        let first = days.next()?;
        Some(days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Distinct substance names in first-seen order
    pub fn substance_names(&self) -> Vec<String> {
        distinct(self.events.iter().filter_map(Event::substance_name))
    }

    /// Distinct activity names in first-seen order
    pub fn activity_names(&self) -> Vec<String> {
        distinct(self.events.iter().filter_map(Event::activity_name))
    }
}

impl FromIterator<Event> for EventTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
