//! Event normalization
//!
//! Turns loosely typed raw rows (column name → cell text) into strict
//! [`Event`]s. Normalization never fails: a bad timestamp is tagged
//! [`EventTime::Unparsed`], a bad value becomes `None`, and a row with an
//! unknown kind is skipped and counted.

use super::types::{Event, EventKind, EventTable, EventTime, NormalizeReport};
use crate::config::{ColumnsConfig, IngestConfig};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// One raw row: column name → cell text
pub type RawRow = HashMap<String, String>;

/// Datetime formats tried after the configured ones
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only formats; these resolve to midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Normalizer for converting raw rows to events
#[derive(Debug, Clone)]
pub struct Normalizer {
    columns: ColumnsConfig,
    extra_formats: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ColumnsConfig::default(), &IngestConfig::default())
    }
}

impl Normalizer {
    pub fn new(columns: ColumnsConfig, ingest: &IngestConfig) -> Self {
        Self {
            columns,
            extra_formats: ingest.timestamp_formats.clone(),
        }
    }

    /// Normalize a batch of raw rows, keeping input order
    pub fn normalize(&self, rows: &[RawRow]) -> (EventTable, NormalizeReport) {
        let mut report = NormalizeReport {
            rows_seen: rows.len(),
            ..Default::default()
        };

        let mut events = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let Some(event) = self.normalize_row(row) else {
                report.unknown_kinds += 1;
                tracing::debug!(
                    row = idx,
                    kind = %cell(row, &self.columns.kind).unwrap_or_default(),
                    "Skipping row with unknown kind"
                );
                continue;
            };

            if !event.time.is_parsed() {
                report.unparsed_timestamps += 1;
            }
            let has_value = match &event.kind {
                EventKind::Mood(v) => v.is_some(),
                EventKind::Substance(n) | EventKind::Activity(n) => n.is_some(),
            };
            if !has_value {
                report.missing_values += 1;
            }
            events.push(event);
        }

        report.events = events.len();
        if report.unparsed_timestamps > 0 {
            tracing::warn!(
                count = report.unparsed_timestamps,
                "Rows with unparseable timestamps are excluded from time-based views"
            );
        }

        (EventTable::new(events), report)
    }

    /// Normalize one row; `None` when the kind column is not recognized
    pub fn normalize_row(&self, row: &RawRow) -> Option<Event> {
        let kind_text = cell(row, &self.columns.kind)?;
        let kind = match kind_text.to_ascii_lowercase().as_str() {
            "mood" => EventKind::Mood(
                cell(row, &self.columns.mood)
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| v.is_finite()),
            ),
            "substance" => EventKind::Substance(cell(row, &self.columns.substance)),
            "activity" => EventKind::Activity(cell(row, &self.columns.activity)),
            _ => return None,
        };

        let time = match cell(row, &self.columns.date) {
            Some(text) => match self.parse_timestamp(&text) {
                Some(dt) => EventTime::At(dt),
                None => EventTime::Unparsed(text),
            },
            None => EventTime::Unparsed(String::new()),
        };

        Some(Event::new(time, kind))
    }

    /// Parse a timestamp using the configured formats, then the built-in ones
    pub fn parse_timestamp(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();

        for fmt in &self.extra_formats {
            if let Some(dt) = parse_with(text, fmt) {
                return Some(dt);
            }
        }

        // Keep the wall-clock time the row was written in
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_local());
        }

        DATETIME_FORMATS
            .iter()
            .chain(DATE_FORMATS)
            .find_map(|fmt| parse_with(text, fmt))
    }
}

fn parse_with(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, fmt)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Trimmed, non-empty cell text
fn cell(row: &RawRow, column: &str) -> Option<String> {
    row.get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_normalize_each_kind() {
        let rows = vec![
            row(&[("Date", "2024-01-15 08:00:00"), ("Type", "mood"), ("Mood", "7")]),
            row(&[("Date", "2024-01-15 09:00:00"), ("Type", "substance"), ("Substance", " Coffee ")]),
            row(&[("Date", "2024-01-15 22:00:00"), ("Type", "activity"), ("Activity", "Sleep Start")]),
        ];

        let (table, report) = Normalizer::default().normalize(&rows);

        assert_eq!(
            table.events(),
            &[
                Event::mood(at("2024-01-15 08:00:00"), 7.0),
                Event::substance(at("2024-01-15 09:00:00"), "Coffee"),
                Event::activity(at("2024-01-15 22:00:00"), "Sleep Start"),
            ]
        );
        assert_eq!(report.rows_seen, 3);
        assert_eq!(report.events, 3);
        assert_eq!(report.unparsed_timestamps, 0);
    }

    #[test]
    fn test_unparseable_timestamp_is_retained_but_tagged() {
        let rows = vec![row(&[("Date", "yesterday-ish"), ("Type", "mood"), ("Mood", "4")])];

        let (table, report) = Normalizer::default().normalize(&rows);

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.events()[0].time,
            EventTime::Unparsed("yesterday-ish".to_string())
        );
        assert_eq!(table.events()[0].mood_value(), Some(4.0));
        assert_eq!(report.unparsed_timestamps, 1);
    }

    #[test]
    fn test_unknown_kind_is_skipped() {
        let rows = vec![
            row(&[("Date", "2024-01-15"), ("Type", "weather"), ("Mood", "3")]),
            row(&[("Date", "2024-01-15")]),
            row(&[("Date", "2024-01-15"), ("Type", "MOOD"), ("Mood", "3")]),
        ];

        let (table, report) = Normalizer::default().normalize(&rows);

        assert_eq!(table.len(), 1);
        assert_eq!(report.unknown_kinds, 2);
    }

    #[test]
    fn test_missing_and_invalid_values_become_none() {
        let rows = vec![
            row(&[("Date", "2024-01-15"), ("Type", "mood"), ("Mood", "")]),
            row(&[("Date", "2024-01-15"), ("Type", "mood"), ("Mood", "great")]),
            row(&[("Date", "2024-01-15"), ("Type", "substance")]),
        ];

        let (table, report) = Normalizer::default().normalize(&rows);

        assert_eq!(table.events()[0].kind, EventKind::Mood(None));
        assert_eq!(table.events()[1].kind, EventKind::Mood(None));
        assert_eq!(table.events()[2].kind, EventKind::Substance(None));
        assert_eq!(report.missing_values, 3);
    }

    #[test]
    fn test_non_finite_moods_are_missing() {
        let rows: Vec<RawRow> = ["NaN", "nan", "inf", "-infinity", "5"]
            .iter()
            .map(|mood| row(&[("Date", "2024-01-15 08:00"), ("Type", "mood"), ("Mood", *mood)]))
            .collect();

        let (table, report) = Normalizer::default().normalize(&rows);

        let values: Vec<Option<f64>> = table.events().iter().map(Event::mood_value).collect();
        assert_eq!(values, vec![None, None, None, None, Some(5.0)]);
        assert_eq!(report.missing_values, 4);
    }

    #[test]
    fn test_timestamp_formats() {
        let n = Normalizer::default();

        assert_eq!(n.parse_timestamp("2024-01-15 08:30:00"), Some(at("2024-01-15 08:30:00")));
        assert_eq!(n.parse_timestamp("2024-01-15T08:30"), Some(at("2024-01-15 08:30:00")));
        assert_eq!(n.parse_timestamp("01/15/2024 08:30"), Some(at("2024-01-15 08:30:00")));
        // Date only resolves to midnight
        assert_eq!(n.parse_timestamp("2024-01-15"), Some(at("2024-01-15 00:00:00")));
        // RFC 3339 keeps the local wall-clock time
        assert_eq!(
            n.parse_timestamp("2024-01-15T23:30:00-05:00"),
            Some(at("2024-01-15 23:30:00"))
        );
        assert_eq!(n.parse_timestamp("15 Jan"), None);
    }

    #[test]
    fn test_configured_columns_and_formats() {
        let columns = ColumnsConfig {
            date: "when".into(),
            kind: "kind".into(),
            mood: "score".into(),
            substance: "Substance".into(),
            activity: "Activity".into(),
        };
        let ingest = IngestConfig {
            timestamp_formats: vec!["%d.%m.%Y %H:%M".into()],
            ..Default::default()
        };
        let n = Normalizer::new(columns, &ingest);

        let event = n
            .normalize_row(&row(&[("when", "15.01.2024 08:30"), ("kind", "mood"), ("score", "6.5")]))
            .unwrap();

        assert_eq!(event, Event::mood(at("2024-01-15 08:30:00"), 6.5));
    }
}
