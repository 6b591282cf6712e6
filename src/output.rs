//! View rendering for the command line
//!
//! Writes derived tables as an aligned text table, JSON, or CSV. Charts are
//! left to whatever consumes the JSON/CSV output.

use crate::analysis::{
    DerivedViews, MoodActivityRow, MoodSleepRow, MoodSubstanceRow, MoodSummary, MoodTrendRow,
    SleepSession,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;

/// Output format for rendered tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values
    Csv,
}

/// Which derived view to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewSelection {
    Trend,
    Substance,
    Activity,
    Sleep,
    Summary,
    #[default]
    All,
}

/// A row that can be printed as a table or CSV line
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn ts(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn opt_ts(dt: &Option<NaiveDateTime>) -> String {
    dt.as_ref().map(ts).unwrap_or_default()
}

fn num(v: f64) -> String {
    format!("{:.2}", v)
}

impl TableRow for MoodTrendRow {
    fn headers() -> &'static [&'static str] {
        &["Date", "Mood", "Hover_Info"]
    }

    fn cells(&self) -> Vec<String> {
        vec![ts(&self.timestamp), self.mood_value.to_string(), self.annotation.clone()]
    }
}

impl TableRow for MoodSubstanceRow {
    fn headers() -> &'static [&'static str] {
        &["Date", "Mood", "Substance"]
    }

    fn cells(&self) -> Vec<String> {
        vec![ts(&self.timestamp), self.mood_value.to_string(), self.substance.clone()]
    }
}

impl TableRow for MoodActivityRow {
    fn headers() -> &'static [&'static str] {
        &["Date", "Mood", "Activity"]
    }

    fn cells(&self) -> Vec<String> {
        vec![ts(&self.timestamp), self.mood_value.to_string(), self.activity.clone()]
    }
}

impl TableRow for MoodSleepRow {
    fn headers() -> &'static [&'static str] {
        &["Date", "Mood", "Sleep Start", "Wake Time", "Sleep Hours"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            ts(&self.timestamp),
            self.mood_value.to_string(),
            opt_ts(&self.sleep_start),
            opt_ts(&self.wake_time),
            self.sleep_hours.map(num).unwrap_or_default(),
        ]
    }
}

impl TableRow for SleepSession {
    fn headers() -> &'static [&'static str] {
        &["Sleep Start", "Wake Time", "Sleep Hours", "Sleep Date"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            ts(&self.start),
            ts(&self.end),
            num(self.duration_hours),
            self.session_day.to_string(),
        ]
    }
}

impl TableRow for MoodSummary {
    fn headers() -> &'static [&'static str] {
        &["Name", "Count", "Mean", "Median", "Min", "Max"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.count.to_string(),
            num(self.mean),
            num(self.median),
            num(self.min),
            num(self.max),
        ]
    }
}

/// Write one table of rows in the requested format
pub fn write_rows<W, T>(out: &mut W, format: OutputFormat, title: &str, rows: &[T]) -> std::io::Result<()>
where
    W: Write,
    T: TableRow + Serialize,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)
        }
        OutputFormat::Csv => write_csv(out, rows),
        OutputFormat::Table => write_table(out, title, rows),
    }
}

/// Write the selected views
pub fn write_views<W: Write>(
    out: &mut W,
    format: OutputFormat,
    views: &DerivedViews,
    selection: ViewSelection,
) -> std::io::Result<()> {
    if format == OutputFormat::Json && selection == ViewSelection::All {
        serde_json::to_writer_pretty(&mut *out, views)?;
        return writeln!(out);
    }

    let all = selection == ViewSelection::All;
    let mut first = true;
    let mut section = |out: &mut W| -> std::io::Result<()> {
        if !first && format != OutputFormat::Json {
            writeln!(out)?;
        }
        first = false;
        Ok(())
    };

    if all || selection == ViewSelection::Trend {
        section(out)?;
        write_rows(out, format, "Mood Trend Over Time", &views.mood_trend)?;
    }
    if all || selection == ViewSelection::Substance {
        section(out)?;
        write_rows(out, format, "Mood by Substance", &views.mood_by_substance)?;
    }
    if all || selection == ViewSelection::Activity {
        section(out)?;
        write_rows(out, format, "Mood by Activity", &views.mood_by_activity)?;
    }
    if all || selection == ViewSelection::Sleep {
        section(out)?;
        write_rows(out, format, "Mood and Sleep", &views.mood_sleep)?;
    }
    if all || selection == ViewSelection::Summary {
        section(out)?;
        write_rows(out, format, "Mood by Substance (summary)", &views.substance_summary)?;
        section(out)?;
        write_rows(out, format, "Mood by Activity (summary)", &views.activity_summary)?;
        if format == OutputFormat::Table {
            section(out)?;
            match &views.sleep_correlation {
                Some(c) => writeln!(
                    out,
                    "Mood vs sleep: r={:.2} ({} {}, n={})",
                    c.coefficient, c.strength, c.direction, c.sample_size
                )?,
                None => writeln!(out, "Mood vs sleep: not enough paired data")?,
            }
        }
    }
    Ok(())
}

fn write_csv<W: Write, T: TableRow>(out: &mut W, rows: &[T]) -> std::io::Result<()> {
    let mut csv = csv::Writer::from_writer(out);
    csv.write_record(T::headers())?;
    for row in rows {
        csv.write_record(row.cells())?;
    }
    csv.flush()
}

fn write_table<W: Write, T: TableRow>(out: &mut W, title: &str, rows: &[T]) -> std::io::Result<()> {
    writeln!(out, "{}", title)?;

    if rows.is_empty() {
        return writeln!(out, "(no rows)");
    }

    // Multi-line cells are flattened for the table
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.cells().into_iter().map(|c| c.replace('\n', "; ")).collect())
        .collect();

    let headers = T::headers();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    write_aligned(out, headers.iter().copied(), &widths)?;
    let total: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    writeln!(out, "{}", "-".repeat(total))?;
    for row in &cells {
        write_aligned(out, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
}

fn write_aligned<'a, W: Write>(
    out: &mut W,
    values: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> std::io::Result<()> {
    let parts: Vec<String> = values
        .zip(widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect();
    writeln!(out, "{}", parts.join(" | ").trim_end())
}
