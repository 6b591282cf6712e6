//! Derived views
//!
//! Table-shaped projections handed to the rendering layer. No business
//! logic lives here beyond the joins themselves:
//!
//! - **mood trend**: correlated mood records sorted by time
//! - **mood by substance / activity**: inner join on *exact* timestamp
//! - **mood + sleep**: left join on calendar day = session day
//!
//! The substance/activity views join on the exact timestamp, while the
//! correlator matches by calendar day.

use super::correlator::MoodRecord;
use super::sessions::{SessionReport, SleepSession};
use super::summary::{summarize_by_name, MoodSummary, SleepCorrelation};
use crate::ingest::{Event, EventTable};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

/// One point of the mood trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodTrendRow {
    pub timestamp: NaiveDateTime,
    pub mood_value: f64,
    pub annotation: String,
}

/// Mood joined with a substance logged at the same instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSubstanceRow {
    pub timestamp: NaiveDateTime,
    pub mood_value: f64,
    pub substance: String,
}

/// Mood joined with an activity logged at the same instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodActivityRow {
    pub timestamp: NaiveDateTime,
    pub mood_value: f64,
    pub activity: String,
}

/// Mood joined with the sleep session that ended on the same day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSleepRow {
    pub timestamp: NaiveDateTime,
    pub mood_value: f64,
    pub calendar_day: NaiveDate,
    pub sleep_start: Option<NaiveDateTime>,
    pub wake_time: Option<NaiveDateTime>,
    pub sleep_hours: Option<f64>,
}

/// Every view computed for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub mood_trend: Vec<MoodTrendRow>,
    pub mood_by_substance: Vec<MoodSubstanceRow>,
    pub mood_by_activity: Vec<MoodActivityRow>,
    pub mood_sleep: Vec<MoodSleepRow>,
    pub sessions: Vec<SleepSession>,
    pub session_report: SessionReport,
    pub substance_summary: Vec<MoodSummary>,
    pub activity_summary: Vec<MoodSummary>,
    pub sleep_correlation: Option<SleepCorrelation>,
}

/// Builds views from correlated records and reconstructed sessions
pub struct ViewBuilder<'a> {
    table: &'a EventTable,
    records: &'a [MoodRecord],
    sessions: &'a [SleepSession],
    annotate_matches: bool,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(table: &'a EventTable, records: &'a [MoodRecord], sessions: &'a [SleepSession]) -> Self {
        Self {
            table,
            records,
            sessions,
            annotate_matches: false,
        }
    }

    /// Include matched names in trend annotations
    pub fn annotate_matches(mut self, enabled: bool) -> Self {
        self.annotate_matches = enabled;
        self
    }

    pub fn mood_trend(&self) -> Vec<MoodTrendRow> {
        let mut rows: Vec<MoodTrendRow> = self
            .records
            .iter()
            .map(|record| MoodTrendRow {
                timestamp: record.timestamp,
                mood_value: record.mood_value,
                annotation: self.annotation(record),
            })
            .collect();
        rows.sort_by_key(|row| row.timestamp);
        rows
    }

    pub fn mood_by_substance(&self) -> Vec<MoodSubstanceRow> {
        self.join_exact(Event::substance_name)
            .into_iter()
            .map(|(record, name)| MoodSubstanceRow {
                timestamp: record.timestamp,
                mood_value: record.mood_value,
                substance: name.to_string(),
            })
            .collect()
    }

    pub fn mood_by_activity(&self) -> Vec<MoodActivityRow> {
        self.join_exact(Event::activity_name)
            .into_iter()
            .map(|(record, name)| MoodActivityRow {
                timestamp: record.timestamp,
                mood_value: record.mood_value,
                activity: name.to_string(),
            })
            .collect()
    }

    /// Left join on day; a day with several sessions yields one row per session
    pub fn mood_sleep(&self) -> Vec<MoodSleepRow> {
        let mut by_day: HashMap<NaiveDate, Vec<&SleepSession>> = HashMap::new();
        for session in self.sessions {
            by_day.entry(session.session_day).or_default().push(session);
        }

        let mut rows = Vec::with_capacity(self.records.len());
        for record in self.records {
            let row = |session: Option<&SleepSession>| MoodSleepRow {
                timestamp: record.timestamp,
                mood_value: record.mood_value,
                calendar_day: record.calendar_day,
                sleep_start: session.map(|s| s.start),
                wake_time: session.map(|s| s.end),
                sleep_hours: session.map(|s| s.duration_hours),
            };

            match by_day.get(&record.calendar_day) {
                Some(sessions) => rows.extend(sessions.iter().map(|s| row(Some(*s)))),
                None => rows.push(row(None)),
            }
        }
        rows
    }

    /// Build every view plus the summaries derived from them
    pub fn build(&self, session_report: SessionReport) -> DerivedViews {
        let mood_by_substance = self.mood_by_substance();
        let mood_by_activity = self.mood_by_activity();
        let mood_sleep = self.mood_sleep();

        let substance_summary = summarize_by_name(
            mood_by_substance
                .iter()
                .map(|row| (row.substance.as_str(), row.mood_value)),
        );
        let activity_summary = summarize_by_name(
            mood_by_activity
                .iter()
                .map(|row| (row.activity.as_str(), row.mood_value)),
        );
        let sleep_pairs: Vec<(f64, f64)> = mood_sleep
            .iter()
            .filter_map(|row| row.sleep_hours.map(|hours| (row.mood_value, hours)))
            .collect();

        DerivedViews {
            mood_trend: self.mood_trend(),
            mood_by_substance,
            mood_by_activity,
            mood_sleep,
            sessions: self.sessions.to_vec(),
            session_report,
            substance_summary,
            activity_summary,
            sleep_correlation: SleepCorrelation::from_pairs(&sleep_pairs),
        }
    }

    fn annotation(&self, record: &MoodRecord) -> String {
        if !self.annotate_matches {
            return format!("Mood: {:?}", record.mood_value);
        }
        format!(
            "Mood: {:?}\nSubstances: {}\nActivities: {}",
            record.mood_value,
            join_or_none(&record.matched_substances),
            join_or_none(&record.matched_activities)
        )
    }

    /// Pair each record with every named event at the identical timestamp
    fn join_exact(&self, name_of: impl Fn(&Event) -> Option<&str>) -> Vec<(&'a MoodRecord, &'a str)> {
        let table: &'a EventTable = self.table;
        let mut at: HashMap<NaiveDateTime, Vec<&'a str>> = HashMap::new();
        for event in table.events() {
            if let (Some(ts), Some(name)) = (event.timestamp(), name_of(event)) {
                at.entry(ts).or_default().push(name);
            }
        }

        let mut pairs = Vec::new();
        for record in self.records {
            if let Some(names) = at.get(&record.timestamp) {
                pairs.extend(names.iter().map(|name| (record, *name)));
            }
        }
        pairs
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
