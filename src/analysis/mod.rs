//! Affectrum Analysis
//!
//! Derives the dashboard views from a normalized [`EventTable`]:
//!
//! - **sessions**: sleep sessions from "Sleep Start" / "Wake Up" markers
//! - **day_index**: per-day sets of substance and activity names
//! - **correlator**: mood entries joined with same-day names, filtered
//! - **views**: table-shaped projections for rendering
//! - **summary**: per-name mood distributions, mood vs. sleep correlation
//!
//! # Architecture
//!
//! ```text
//!   EventTable ─┬─→ SessionReconstructor ─→ SleepSession ──────┐
//!               └─→ SameDayCorrelator ───→ MoodRecord ─────────┴─→ ViewBuilder → DerivedViews
//! ```
//!
//! Every query recomputes from the immutable table, so the same inputs
//! always give the same views.

pub mod correlator;
pub mod day_index;
pub mod sessions;
pub mod summary;
pub mod views;

pub use correlator::{CorrelationQuery, MoodRecord, SameDayCorrelator};
pub use day_index::DayIndex;
pub use sessions::{SessionReconstructor, SessionReport, SleepSession};
pub use summary::{pearson_correlation, MoodSummary, SleepCorrelation};
pub use views::{
    DerivedViews, MoodActivityRow, MoodSleepRow, MoodSubstanceRow, MoodTrendRow, ViewBuilder,
};

use crate::config::SleepConfig;
use crate::ingest::EventTable;

/// Runs queries against one loaded log
pub struct Analyzer {
    table: EventTable,
    reconstructor: SessionReconstructor,
}

impl Analyzer {
    pub fn new(table: EventTable, sleep: &SleepConfig) -> Self {
        Self {
            table,
            reconstructor: SessionReconstructor::new(sleep),
        }
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    /// Reconstructed sleep sessions over the whole log
    pub fn sessions(&self) -> (Vec<SleepSession>, SessionReport) {
        self.reconstructor.reconstruct(&self.table)
    }

    /// Correlated mood records for one query
    pub fn correlate(&self, query: &CorrelationQuery) -> Vec<MoodRecord> {
        SameDayCorrelator::new(&self.table).correlate(query)
    }

    /// Compute every derived view for one query
    pub fn analyze(&self, query: &CorrelationQuery) -> DerivedViews {
        let records = self.correlate(query);
        let (sessions, report) = self.sessions();

        let views = ViewBuilder::new(&self.table, &records, &sessions)
            .annotate_matches(query.has_filters())
            .build(report);

        tracing::info!(
            moods = views.mood_trend.len(),
            substance_rows = views.mood_by_substance.len(),
            activity_rows = views.mood_by_activity.len(),
            sessions = views.sessions.len(),
            "Computed derived views"
        );

        views
    }
}
