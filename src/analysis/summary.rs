//! Summary statistics over the derived views
//!
//! - Per-name mood distribution for the substance and activity join views
//! - Pearson correlation between mood and sleep duration

use serde::Serialize;
use std::collections::HashMap;

/// Mood distribution for one substance or activity name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Correlation between mood and sleep hours
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepCorrelation {
    /// Pearson correlation coefficient (-1 to 1)
    pub coefficient: f64,
    /// Human-readable strength: "strong", "moderate", "weak", "negligible"
    pub strength: String,
    /// Direction: "positive" or "negative"
    pub direction: String,
    /// Number of (mood, sleep) pairs used
    pub sample_size: usize,
}

impl SleepCorrelation {
    /// Correlate paired samples; `None` with fewer than two pairs or no variance
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Option<Self> {
        if pairs.len() < 2 {
            return None;
        }

        let (mood, sleep): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        let r = pearson_correlation(&mood, &sleep)?;

        Some(Self {
            coefficient: (r * 100.0).round() / 100.0,
            strength: correlation_strength(r).to_string(),
            direction: if r >= 0.0 { "positive" } else { "negative" }.to_string(),
            sample_size: pairs.len(),
        })
    }
}

/// Summarize mood values grouped by name, in first-seen name order
pub fn summarize_by_name<'a>(rows: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<MoodSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();

    for (name, mood) in rows {
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(mood);
    }

    order
        .into_iter()
        .filter_map(|name| {
            let mut values = groups.remove(name)?;
            values.sort_by(f64::total_cmp);
            let count = values.len();
            let median = if count % 2 == 1 {
                values[count / 2]
            } else {
                (values[count / 2 - 1] + values[count / 2]) / 2.0
            };
            Some(MoodSummary {
                name: name.to_string(),
                count,
                mean: values.iter().sum::<f64>() / count as f64,
                median,
                min: values[0],
                max: values[count - 1],
            })
        })
        .collect()
}

/// Calculate Pearson correlation coefficient
///
/// Returns `None` for mismatched or empty input and when either side has
/// zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    if is_constant(x) || is_constant(y) {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        None
    } else {
        Some((cov / denominator).clamp(-1.0, 1.0))
    }
}

/// All values equal within a relative tolerance
fn is_constant(values: &[f64]) -> bool {
    let first = values[0];
    let tolerance = f64::EPSILON * 16.0 * first.abs().max(1.0);
    values.iter().all(|v| (v - first).abs() <= tolerance)
}

/// Convert correlation coefficient to human-readable strength
fn correlation_strength(r: f64) -> &'static str {
    let abs_r = r.abs();
    if abs_r > 0.7 {
        "strong"
    } else if abs_r > 0.5 {
        "moderate"
    } else if abs_r > 0.3 {
        "weak"
    } else {
        "negligible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pearson_correlation_perfect_positive() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let r = pearson_correlation(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pearson_correlation_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];
        let r = pearson_correlation(&x, &y).unwrap();
        assert!((r + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_pearson_correlation_degenerate() {
        assert_eq!(pearson_correlation(&[], &[]), None);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[1.0]), None);
        // Constant series has no variance
        assert_eq!(pearson_correlation(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_correlation_strength() {
        assert_eq!(correlation_strength(0.8), "strong");
        assert_eq!(correlation_strength(-0.75), "strong");
        assert_eq!(correlation_strength(0.6), "moderate");
        assert_eq!(correlation_strength(0.4), "weak");
        assert_eq!(correlation_strength(0.2), "negligible");
    }

    #[test]
    fn test_sleep_correlation_from_pairs() {
        let pairs = [(4.0, 5.0), (6.0, 7.0), (8.0, 9.0)];
        let corr = SleepCorrelation::from_pairs(&pairs).unwrap();

        assert_eq!(corr.coefficient, 1.0);
        assert_eq!(corr.strength, "strong");
        assert_eq!(corr.direction, "positive");
        assert_eq!(corr.sample_size, 3);

        assert_eq!(SleepCorrelation::from_pairs(&[(5.0, 7.0)]), None);
    }

    #[test]
    fn test_constant_fractional_sleep_has_no_correlation() {
        let pairs = [(3.0, 7.7), (5.0, 7.7), (6.0, 7.7), (8.0, 7.7), (9.0, 7.7)];
        assert_eq!(SleepCorrelation::from_pairs(&pairs), None);

        let moods = [2.5, 2.5, 2.5];
        assert_eq!(pearson_correlation(&moods, &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_summarize_by_name() {
        let rows = vec![
            ("Coffee", 6.0),
            ("Alcohol", 3.0),
            ("Coffee", 8.0),
            ("Coffee", 7.0),
            ("Alcohol", 5.0),
        ];

        let summaries = summarize_by_name(rows);

        assert_eq!(
            summaries,
            vec![
                MoodSummary {
                    name: "Coffee".into(),
                    count: 3,
                    mean: 7.0,
                    median: 7.0,
                    min: 6.0,
                    max: 8.0,
                },
                MoodSummary {
                    name: "Alcohol".into(),
                    count: 2,
                    mean: 4.0,
                    median: 4.0,
                    min: 3.0,
                    max: 5.0,
                },
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize_by_name(Vec::<(&str, f64)>::new()).is_empty());
    }
}
