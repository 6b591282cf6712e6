//! Affectrum CLI
//!
//! Command-line interface for Affectrum:
//! - Analyze a behavioral log with date and name filters
//! - Inspect reconstructed sleep sessions
//! - List the filter options a log offers
//! - Record and export clinician notes

use affectrum::analysis::CorrelationQuery;
use affectrum::config::{generate_default_config, Config};
use affectrum::ingest::{load_log, EventTable};
use affectrum::notes::{NoteLog, PdfOptions};
use affectrum::output::{write_rows, write_views, OutputFormat, ViewSelection};
use affectrum::Analyzer;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "affectrum")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mood, substance, activity and sleep views from a behavioral log")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/affectrum/config.toml or ./affectrum.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute mood views for a log
    Analyze {
        /// Path to the CSV log
        path: PathBuf,
        /// First day to include (YYYY-MM-DD, default: first day in the log)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD, default: last day in the log)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Keep moods on days with this substance (repeatable)
        #[arg(short, long)]
        substance: Vec<String>,
        /// Keep moods on days with this activity (repeatable)
        #[arg(short, long)]
        activity: Vec<String>,
        /// Which view to print
        #[arg(long, value_enum, default_value = "all")]
        view: ViewSelection,
    },

    /// Show reconstructed sleep sessions
    Sessions {
        /// Path to the CSV log
        path: PathBuf,
    },

    /// Show date bounds and the substance/activity names in a log
    Options {
        /// Path to the CSV log
        path: PathBuf,
    },

    /// Clinician notes
    Notes {
        #[command(subcommand)]
        action: NotesCommand,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum NotesCommand {
    /// Append a note
    Add {
        /// Note text
        text: String,
        /// Date to stamp the note with (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List saved notes
    List,
    /// Export notes as CSV and/or PDF
    Export {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load_default(),
    };

    init_logging(&config);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("affectrum={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli, config: &Config) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Analyze {
            path,
            start,
            end,
            substance,
            activity,
            view,
        } => {
            let table = load(&path, config)?;
            let mut query = CorrelationQuery::new();
            query.start_date = start;
            query.end_date = end;
            query.substances.extend(split_names(&substance));
            query.activities.extend(split_names(&activity));

            let analyzer = Analyzer::new(table, &config.sleep);
            let views = analyzer.analyze(&query);
            write_views(&mut out, cli.format, &views, view)?;
        }

        Commands::Sessions { path } => {
            let table = load(&path, config)?;
            let (sessions, report) = Analyzer::new(table, &config.sleep).sessions();

            write_rows(&mut out, cli.format, "Sleep Sessions", &sessions)?;
            if cli.format == OutputFormat::Table {
                writeln!(out)?;
                writeln!(out, "Overwritten sleep starts: {}", report.overwritten_starts)?;
                writeln!(out, "Wake ups without a start: {}", report.orphan_wakes)?;
                if let Some(start) = report.trailing_start {
                    writeln!(out, "Open sleep start at end of log: {}", start)?;
                }
            }
        }

        Commands::Options { path } => {
            let table = load(&path, config)?;
            print_options(&mut out, cli.format, &table)?;
        }

        Commands::Notes { action } => {
            let store = PathBuf::from(&config.notes.file);
            let mut log = NoteLog::load(&store)
                .with_context(|| format!("reading note store {}", store.display()))?;

            match action {
                NotesCommand::Add { text, date } => {
                    if text.trim().is_empty() {
                        bail!("note text is empty");
                    }
                    let date = date.unwrap_or_else(|| Local::now().date_naive());
                    log.append(date, text);
                    log.save(&store)?;
                    writeln!(out, "Note saved ({} total)", log.len())?;
                }
                NotesCommand::List => {
                    if log.is_empty() {
                        writeln!(out, "No notes saved yet.")?;
                    }
                    for note in log.notes() {
                        writeln!(out, "{}: {}", note.timestamp, note.text)?;
                    }
                }
                NotesCommand::Export { csv, pdf } => {
                    if csv.is_none() && pdf.is_none() {
                        bail!("pass --csv PATH and/or --pdf PATH");
                    }
                    if let Some(path) = csv {
                        log.export_csv(std::fs::File::create(&path)?)?;
                        writeln!(out, "Exported {} notes to {:?}", log.len(), path)?;
                    }
                    if let Some(path) = pdf {
                        let mut file = std::fs::File::create(&path)?;
                        log.export_pdf(&mut file, &PdfOptions::from(&config.notes))?;
                        writeln!(out, "Exported {} notes to {:?}", log.len(), path)?;
                    }
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    writeln!(out, "Config written to {:?}", path)?;
                }
                None => {
                    write!(out, "{}", content)?;
                }
            }
        }
    }

    Ok(())
}

fn load(path: &Path, config: &Config) -> anyhow::Result<EventTable> {
    if !path.exists() {
        bail!("file not found: {}", path.display());
    }
    let (table, report) =
        load_log(path, config).with_context(|| format!("reading log {}", path.display()))?;
    if report.unparsed_timestamps > 0 {
        eprintln!(
            "Note: {} rows with unparseable dates are excluded from time-based views",
            report.unparsed_timestamps
        );
    }
    Ok(table)
}

/// Flatten repeated and comma-separated names
fn split_names(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(',').map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn print_options<W: Write>(out: &mut W, format: OutputFormat, table: &EventTable) -> anyhow::Result<()> {
    let bounds = table.date_bounds();
    let substances = table.substance_names();
    let activities = table.activity_names();

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "start_date": bounds.map(|(lo, _)| lo),
                "end_date": bounds.map(|(_, hi)| hi),
                "substances": substances,
                "activities": activities,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(out);
            csv.write_record(["kind", "value"])?;
            if let Some((lo, hi)) = bounds {
                csv.write_record(["start_date", lo.to_string().as_str()])?;
                csv.write_record(["end_date", hi.to_string().as_str()])?;
            }
            for name in &substances {
                csv.write_record(["substance", name.as_str()])?;
            }
            for name in &activities {
                csv.write_record(["activity", name.as_str()])?;
            }
            csv.flush()?;
        }
        OutputFormat::Table => {
            match bounds {
                Some((lo, hi)) => writeln!(out, "Dates:      {} to {}", lo, hi)?,
                None => writeln!(out, "Dates:      (no parseable dates)")?,
            }
            writeln!(out, "Substances: {}", list_or_dash(&substances))?;
            writeln!(out, "Activities: {}", list_or_dash(&activities))?;
        }
    }
    Ok(())
}

fn list_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
