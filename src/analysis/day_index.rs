//! Day Index - per-day lookup of substance or activity names
//!
//! Maps calendar day → set of distinct names logged that day, so the
//! correlator can annotate each mood entry with one O(1) lookup.
//!
//! # Example
//! ```ignore
//! let substances = DayIndex::substances(&table);
//! // 2024-01-15 → {"Alcohol", "Coffee"}
//! let names = substances.lookup(day);
//! ```

use crate::ingest::{Event, EventTable};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Read-only index: day → distinct names
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    days: HashMap<NaiveDate, BTreeSet<String>>,
}

impl DayIndex {
    /// Index every named substance event with a parsed timestamp
    pub fn substances(table: &EventTable) -> Self {
        Self::build(table, Event::substance_name)
    }

    /// Index every named activity event with a parsed timestamp
    pub fn activities(table: &EventTable) -> Self {
        Self::build(table, Event::activity_name)
    }

    fn build(table: &EventTable, name_of: impl Fn(&Event) -> Option<&str>) -> Self {
        let mut days: HashMap<NaiveDate, BTreeSet<String>> = HashMap::new();

        for event in table.events() {
            if let (Some(day), Some(name)) = (event.day(), name_of(event)) {
                days.entry(day).or_default().insert(name.to_string());
            }
        }

        Self { days }
    }

    /// Names logged on `day`, `None` if the day has no entries
    pub fn lookup(&self, day: NaiveDate) -> Option<&BTreeSet<String>> {
        self.days.get(&day)
    }

    /// Names logged on `day` as an owned list (empty when absent)
    pub fn names_on(&self, day: NaiveDate) -> Vec<String> {
        self.lookup(day)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of indexed days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
