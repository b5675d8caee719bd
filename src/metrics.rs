use serde::Serialize;
use std::collections::HashMap;

use crate::data::SignalCount;
use crate::types::SignalLabel;

/// Descriptive statistics over a set of scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the middle pair for even counts).
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl SummaryStats {
    /// Compute statistics over `values`; an empty slice yields all zeros.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };
        Self {
            count,
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
        }
    }
}

/// Most frequent signal labels, highest count first, ties broken by label.
pub fn top_signals(counts: &HashMap<SignalLabel, usize>, limit: usize) -> Vec<SignalCount> {
    let mut ranked: Vec<SignalCount> = counts
        .iter()
        .map(|(label, count)| SignalCount {
            label: label.clone(),
            count: *count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked.truncate(limit);
    ranked
}

/// Pearson correlation of two equally sized series.
///
/// Returns `None` for fewer than two points or when either series is constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_stats_match_population_definitions() {
        let stats = SummaryStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-9);
        assert!((stats.median - 4.5).abs() < 1e-9);
        assert!((stats.std - 2.0).abs() < 1e-9);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }

    #[test]
    fn summary_stats_handle_empty_and_odd_inputs() {
        assert_eq!(SummaryStats::from_values(&[]), SummaryStats::default());
        let stats = SummaryStats::from_values(&[3.0, 1.0, 2.0]);
        assert_eq!(stats.median, 2.0);
    }

    #[test]
    fn top_signals_orders_by_count_then_label() {
        let mut counts = HashMap::new();
        counts.insert("b".to_string(), 3);
        counts.insert("a".to_string(), 3);
        counts.insert("c".to_string(), 7);
        counts.insert("d".to_string(), 1);
        let top = top_signals(&counts, 3);
        let labels: Vec<&str> = top.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }

    #[test]
    fn pearson_detects_linear_relationships() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&xs, &ys).unwrap() - 1.0).abs() < 1e-9);
        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &inverse).unwrap() + 1.0).abs() < 1e-9);
        assert!(pearson(&xs, &[1.0, 1.0, 1.0, 1.0]).is_none());
        assert!(pearson(&[1.0], &[1.0]).is_none());
    }
}
