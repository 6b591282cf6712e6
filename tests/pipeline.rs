//! End-to-end tests: CSV text through ingest, correlation and views

use affectrum::*;
use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

const LOG: &str = "\
Date,Type,Mood,Substance,Activity
2024-01-01 08:00:00,Mood,6,,
2024-01-01 08:00:00,Substance,,Coffee,
2024-01-01 12:00:00,Activity,,,Exercise
2024-01-01 22:30:00,Activity,,,Sleep Start
2024-01-02 06:00:00,Activity,,,Wake Up
2024-01-02 09:00:00,Mood,4,,
2024-01-02 09:00:00,Substance,,Alcohol,
2024-01-02 10:00:00,Substance,,Coffee,
2024-01-03 00:00:00,Mood,8,,
2024-01-03 07:00:00,Activity,,,Exercise
not a date,Mood,3,,
2024-01-03 10:00:00,Note,,,
";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn load(csv: &str) -> (EventTable, NormalizeReport) {
    let imported = CsvImporter::new().import_str(csv).unwrap();
    Normalizer::default().normalize(&imported.rows)
}

fn analyzer(csv: &str) -> Analyzer {
    Analyzer::new(load(csv).0, &Config::default().sleep)
}

#[test]
fn test_normalize_report_counts() {
    let (table, report) = load(LOG);

    assert_eq!(report.rows_seen, 12);
    assert_eq!(report.unknown_kinds, 1);
    assert_eq!(report.unparsed_timestamps, 1);
    assert_eq!(table.len(), 11);
    assert_eq!(table.date_bounds(), Some((day(2024, 1, 1), day(2024, 1, 3))));
    assert_eq!(table.substance_names(), vec!["Coffee", "Alcohol"]);
    assert_eq!(table.activity_names(), vec!["Exercise", "Sleep Start", "Wake Up"]);
}

#[test]
fn test_unfiltered_query_keeps_every_parsed_mood() {
    let records = analyzer(LOG).correlate(&CorrelationQuery::new());

    let moods: Vec<f64> = records.iter().map(|r| r.mood_value).collect();
    assert_eq!(moods, vec![6.0, 4.0, 8.0]);
    assert_eq!(records[1].matched_substances, vec!["Alcohol", "Coffee"]);
}

#[test]
fn test_name_filters_intersect_within_kind_and_combine_across_kinds() {
    let analyzer = analyzer(LOG);

    let alcohol = analyzer.correlate(&CorrelationQuery::new().substance("Alcohol"));
    assert_eq!(alcohol.len(), 1);
    assert_eq!(alcohol[0].calendar_day, day(2024, 1, 2));

    // Any listed substance is enough
    let either = analyzer.correlate(
        &CorrelationQuery::new()
            .substance("Alcohol")
            .substance("Nicotine"),
    );
    assert_eq!(either.len(), 1);

    let coffee = analyzer.correlate(&CorrelationQuery::new().substance("Coffee"));
    assert_eq!(coffee.len(), 2);

    let mixed = analyzer.correlate(
        &CorrelationQuery::new()
            .substance("Coffee")
            .activity("Exercise"),
    );
    assert_eq!(mixed.len(), 1);
    assert_eq!(mixed[0].calendar_day, day(2024, 1, 1));

    let none = analyzer.correlate(&CorrelationQuery::new().substance("Nicotine"));
    assert!(none.is_empty());
}

#[test]
fn test_date_range_is_inclusive_on_both_ends() {
    let analyzer = analyzer(LOG);

    let records = analyzer.correlate(
        &CorrelationQuery::new()
            .start(day(2024, 1, 2))
            .end(day(2024, 1, 3)),
    );
    let stamps: Vec<NaiveDateTime> = records.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![at("2024-01-02 09:00:00"), at("2024-01-03 00:00:00")]);

    let inverted = analyzer.correlate(
        &CorrelationQuery::new()
            .start(day(2024, 1, 3))
            .end(day(2024, 1, 1)),
    );
    assert!(inverted.is_empty());
}

#[test]
fn test_sessions_pair_most_recent_start() {
    let csv = "\
Date,Type,Mood,Substance,Activity
2024-01-01 22:00:00,Activity,,,Sleep Start
2024-01-02 06:00:00,Activity,,,Wake Up
2024-01-02 23:00:00,Activity,,,Sleep Start
2024-01-03 07:00:00,Activity,,,Wake Up
";
    let (sessions, report) = analyzer(csv).sessions();

    let hours: Vec<f64> = sessions.iter().map(|s| s.duration_hours).collect();
    assert_eq!(hours, vec![8.0, 8.0]);
    assert_eq!(sessions[0].session_day, day(2024, 1, 2));
    assert_eq!(sessions[1].session_day, day(2024, 1, 3));
    assert_eq!(report, SessionReport::default());
}

#[test]
fn test_sessions_report_data_quality() {
    let csv = "\
Date,Type,Mood,Substance,Activity
2024-01-01 05:00:00,Activity,,,Wake Up
2024-01-01 21:00:00,Activity,,,Sleep Start
2024-01-01 23:00:00,Activity,,,Sleep Start
2024-01-02 07:00:00,Activity,,,Wake Up
2024-01-02 22:00:00,Activity,,,Sleep Start
";
    let (sessions, report) = analyzer(csv).sessions();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start, at("2024-01-01 23:00:00"));
    assert_eq!(report.overwritten_starts, 1);
    assert_eq!(report.orphan_wakes, 1);
    assert_eq!(report.trailing_start, Some(at("2024-01-02 22:00:00")));
}

#[test]
fn test_mood_sleep_is_left_join_on_wake_day() {
    let views = analyzer(LOG).analyze(&CorrelationQuery::new());

    assert_eq!(views.mood_sleep.len(), 3);
    let hours: Vec<Option<f64>> = views.mood_sleep.iter().map(|r| r.sleep_hours).collect();
    assert_eq!(hours, vec![None, Some(7.5), None]);
    assert_eq!(views.mood_sleep[1].wake_time, Some(at("2024-01-02 06:00:00")));
}

#[test]
fn test_exact_timestamp_joins() {
    let views = analyzer(LOG).analyze(&CorrelationQuery::new());

    // Only Alcohol shares the 09:00 mood timestamp on Jan 2
    let substances: Vec<(&str, f64)> = views
        .mood_by_substance
        .iter()
        .map(|r| (r.substance.as_str(), r.mood_value))
        .collect();
    assert_eq!(substances, vec![("Coffee", 6.0), ("Alcohol", 4.0)]);

    // Exercise on Jan 3 is at 07:00, the mood is at midnight
    assert!(views.mood_by_activity.is_empty());
}

const JOIN_LOG: &str = "\
Date,Type,Mood,Substance,Activity
2024-02-01 08:00:00,Mood,5,,
2024-02-01 08:00:00,Substance,,Coffee,
2024-02-01 08:00:00,Activity,,,Walk
2024-02-02 08:00:00,Mood,7,,
2024-02-02 08:00:00,Substance,,Tea,
2024-02-02 08:00:00,Activity,,,Run
2024-02-02 08:00:00,Substance,,,
2024-02-02 08:00:00,Activity,,,
2024-02-03 08:00:00,Mood,,,
2024-02-03 08:00:00,Mood,NaN,,
2024-02-03 08:00:00,Substance,,Coffee,
";

fn substance_pairs(views: &DerivedViews) -> Vec<(&str, f64)> {
    views
        .mood_by_substance
        .iter()
        .map(|r| (r.substance.as_str(), r.mood_value))
        .collect()
}

fn activity_pairs(views: &DerivedViews) -> Vec<(&str, f64)> {
    views
        .mood_by_activity
        .iter()
        .map(|r| (r.activity.as_str(), r.mood_value))
        .collect()
}

#[test]
fn test_filtered_out_moods_leave_the_exact_timestamp_joins() {
    let analyzer = analyzer(JOIN_LOG);

    let all = analyzer.analyze(&CorrelationQuery::new());
    assert_eq!(substance_pairs(&all), vec![("Coffee", 5.0), ("Tea", 7.0)]);

    let tea = analyzer.analyze(&CorrelationQuery::new().substance("Tea"));
    assert_eq!(tea.mood_trend.len(), 1);
    assert_eq!(substance_pairs(&tea), vec![("Tea", 7.0)]);
    assert_eq!(activity_pairs(&tea), vec![("Run", 7.0)]);
    assert_eq!(tea.mood_sleep.len(), 1);
}

#[test]
fn test_nameless_events_are_not_joined() {
    let views = analyzer(JOIN_LOG).analyze(&CorrelationQuery::new());

    assert_eq!(substance_pairs(&views), vec![("Coffee", 5.0), ("Tea", 7.0)]);
    assert_eq!(activity_pairs(&views), vec![("Walk", 5.0), ("Run", 7.0)]);
}

#[test]
fn test_missing_moods_are_counted_and_excluded_from_views() {
    let (table, report) = load(JOIN_LOG);
    // Blank and NaN moods plus the nameless substance and activity
    assert_eq!(report.missing_values, 4);

    let views = Analyzer::new(table, &Config::default().sleep).analyze(&CorrelationQuery::new());

    let trend: Vec<f64> = views.mood_trend.iter().map(|r| r.mood_value).collect();
    assert_eq!(trend, vec![5.0, 7.0]);
    assert_eq!(views.mood_sleep.len(), 2);
    // Coffee on Feb 3 has no mood to join with
    assert_eq!(views.substance_summary[0].name, "Coffee");
    assert_eq!(views.substance_summary[0].count, 1);
}

#[test]
fn test_trend_annotations_follow_filters() {
    let analyzer = analyzer(LOG);

    let plain = analyzer.analyze(&CorrelationQuery::new());
    assert_eq!(plain.mood_trend[0].annotation, "Mood: 6.0");

    let filtered = analyzer.analyze(&CorrelationQuery::new().substance("Coffee"));
    assert_eq!(filtered.mood_trend.len(), 2);
    assert_eq!(
        filtered.mood_trend[0].annotation,
        "Mood: 6.0\nSubstances: Coffee\nActivities: Exercise, Sleep Start"
    );
}

#[test]
fn test_analysis_is_idempotent() {
    let analyzer = analyzer(LOG);
    let query = CorrelationQuery::new().activity("Exercise");

    assert_eq!(analyzer.analyze(&query), analyzer.analyze(&query));
}

#[test]
fn test_day_index_over_full_table() {
    let (table, _) = load(LOG);
    let index = DayIndex::substances(&table);

    assert_eq!(index.len(), 2);
    assert_eq!(index.names_on(day(2024, 1, 2)), vec!["Alcohol", "Coffee"]);
    assert!(index.lookup(day(2024, 1, 3)).is_none());
}

#[test]
fn test_load_log_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    std::fs::write(&path, LOG).unwrap();

    let (table, report) = affectrum::ingest::load_log(&path, &Config::default()).unwrap();
    assert_eq!(table.len(), report.events);
}

#[test]
fn test_notes_round_trip_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.csv");

    let mut log = NoteLog::load(&path).unwrap();
    assert!(log.is_empty());
    log.append(day(2024, 3, 1), "Sleep improved after cutting caffeine");
    log.save(&path).unwrap();

    let reloaded = NoteLog::load(&path).unwrap();
    assert_eq!(reloaded.notes(), log.notes());
    assert_eq!(reloaded.notes()[0].timestamp, "2024-03-01");
}
