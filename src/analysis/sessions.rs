//! Sleep session reconstruction
//!
//! Pairs each "Sleep Start" activity with the next "Wake Up" activity to
//! recover sleep sessions from the flat event stream.
//!
//! # Pairing rules
//!
//! ```text
//!   Start  → remember as pending (replaces any unconsumed pending start)
//!   Wake   → pending? emit session, clear pending : drop the wake
//! ```
//!
//! Overwritten starts and orphan wakes are data-quality gaps in the log, so
//! both are logged and counted in [`SessionReport`].

use crate::config::SleepConfig;
use crate::ingest::EventTable;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A reconstructed sleep interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepSession {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_hours: f64,
    /// Calendar day of the wake time
    pub session_day: NaiveDate,
}

impl SleepSession {
    fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let seconds = (end - start).num_milliseconds() as f64 / 1000.0;
        Self {
            start,
            end,
            duration_hours: seconds / 3600.0,
            session_day: end.date(),
        }
    }
}

/// Data-quality counters from one reconstruction pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    /// Sleep Starts replaced by a later Sleep Start before any Wake Up
    pub overwritten_starts: usize,
    /// Wake Ups with no pending Sleep Start
    pub orphan_wakes: usize,
    /// Sleep Start still pending when the log ended
    pub trailing_start: Option<NaiveDateTime>,
}

/// Marker seen while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Start,
    Wake,
}

/// Rebuilds sleep sessions from activity markers
#[derive(Debug, Clone)]
pub struct SessionReconstructor {
    start_marker: String,
    wake_marker: String,
}

impl Default for SessionReconstructor {
    fn default() -> Self {
        Self::new(&SleepConfig::default())
    }
}

impl SessionReconstructor {
    pub fn new(config: &SleepConfig) -> Self {
        Self {
            start_marker: config.start_marker.clone(),
            wake_marker: config.wake_marker.clone(),
        }
    }

    /// Reconstruct sessions from every marker event in the table
    ///
    /// Marker events are taken in ascending timestamp order; ties keep input
    /// order. Events with unparsed timestamps are never considered.
    pub fn reconstruct(&self, table: &EventTable) -> (Vec<SleepSession>, SessionReport) {
        let mut markers: Vec<(NaiveDateTime, Marker)> = table
            .events()
            .iter()
            .filter_map(|event| {
                let at = event.timestamp()?;
                let name = event.activity_name()?;
                self.marker(name).map(|m| (at, m))
            })
            .collect();

        // Stable: identical timestamps stay in input order
        markers.sort_by_key(|(at, _)| *at);

        self.pair(&markers)
    }

    fn marker(&self, name: &str) -> Option<Marker> {
        if name == self.start_marker {
            Some(Marker::Start)
        } else if name == self.wake_marker {
            Some(Marker::Wake)
        } else {
            None
        }
    }

    fn pair(&self, markers: &[(NaiveDateTime, Marker)]) -> (Vec<SleepSession>, SessionReport) {
        let mut sessions = Vec::new();
        let mut report = SessionReport::default();
        let mut pending: Option<NaiveDateTime> = None;

        for &(at, marker) in markers {
            match marker {
                Marker::Start => {
                    if let Some(previous) = pending.replace(at) {
                        report.overwritten_starts += 1;
                        tracing::warn!(
                            dropped = %previous,
                            replaced_by = %at,
                            "Sleep start without a wake up was overwritten"
                        );
                    }
                }
                Marker::Wake => match pending.take() {
                    Some(start) => sessions.push(SleepSession::between(start, at)),
                    None => {
                        report.orphan_wakes += 1;
                        tracing::warn!(at = %at, "Wake up without a pending sleep start");
                    }
                },
            }
        }

        if let Some(start) = pending {
            tracing::debug!(start = %start, "Log ended with an open sleep start");
            report.trailing_start = Some(start);
        }

        tracing::debug!(sessions = sessions.len(), "Reconstructed sleep sessions");
        (sessions, report)
    }
}
