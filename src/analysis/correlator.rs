//! Same-day correlation
//!
//! Selects mood entries in a date range and annotates each with the
//! substances and activities logged on the same calendar day, then applies
//! the optional substance/activity filters.
//!
//! # Flow
//!
//! ```text
//! EventTable ─┬─ mood events in [start, end] ──────────┐
//!             ├─ DayIndex(substances) ─ lookup(day) ───┼─→ MoodRecord → filters
//!             └─ DayIndex(activities) ─ lookup(day) ───┘
//! ```

use super::day_index::DayIndex;
use crate::ingest::EventTable;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;

/// A mood entry annotated with same-day substances and activities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodRecord {
    pub timestamp: NaiveDateTime,
    pub mood_value: f64,
    pub calendar_day: NaiveDate,
    pub matched_substances: Vec<String>,
    pub matched_activities: Vec<String>,
}

/// Filter parameters for one correlation query
///
/// Unset dates default to the event table's date bounds. Empty name sets
/// mean "no filtering".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub substances: BTreeSet<String>,
    pub activities: BTreeSet<String>,
}

impl CorrelationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: first day to include
    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Builder: last day to include
    pub fn end(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Builder: require a same-day substance
    pub fn substance(mut self, name: impl Into<String>) -> Self {
        self.substances.insert(name.into());
        self
    }

    /// Builder: require a same-day activity
    pub fn activity(mut self, name: impl Into<String>) -> Self {
        self.activities.insert(name.into());
        self
    }

    /// Whether any name filter is active
    pub fn has_filters(&self) -> bool {
        !self.substances.is_empty() || !self.activities.is_empty()
    }

    /// Inclusive day range, resolving unset ends against the table
    pub fn resolve_range(&self, table: &EventTable) -> Option<(NaiveDate, NaiveDate)> {
        let bounds = table.date_bounds();
        let start = self.start_date.or(bounds.map(|(lo, _)| lo))?;
        let end = self.end_date.or(bounds.map(|(_, hi)| hi))?;
        Some((start, end))
    }
}

/// Joins mood entries against same-day substance and activity indexes
pub struct SameDayCorrelator<'a> {
    table: &'a EventTable,
    substances: DayIndex,
    activities: DayIndex,
}

impl<'a> SameDayCorrelator<'a> {
    /// Build both day indexes over the full, unfiltered table
    pub fn new(table: &'a EventTable) -> Self {
        Self {
            table,
            substances: DayIndex::substances(table),
            activities: DayIndex::activities(table),
        }
    }

    /// Run one query, returning records in input order
    pub fn correlate(&self, query: &CorrelationQuery) -> Vec<MoodRecord> {
        let Some((start, end)) = query.resolve_range(self.table) else {
            return Vec::new();
        };

        let records: Vec<MoodRecord> = self
            .table
            .events()
            .iter()
            .filter_map(|event| {
                let timestamp = event.timestamp()?;
                let mood_value = event.mood_value()?;
                let calendar_day = timestamp.date();
                if calendar_day < start || calendar_day > end {
                    return None;
                }
                Some(MoodRecord {
                    timestamp,
                    mood_value,
                    calendar_day,
                    matched_substances: self.substances.names_on(calendar_day),
                    matched_activities: self.activities.names_on(calendar_day),
                })
            })
            .filter(|record| {
                intersects(&record.matched_substances, &query.substances)
                    && intersects(&record.matched_activities, &query.activities)
            })
            .collect();

        tracing::debug!(
            %start,
            %end,
            substances = query.substances.len(),
            activities = query.activities.len(),
            records = records.len(),
            "Correlated mood entries"
        );

        records
    }
}

/// An empty filter matches everything
fn intersects(matched: &[String], filter: &BTreeSet<String>) -> bool {
    filter.is_empty() || matched.iter().any(|name| filter.contains(name))
}
