//! Bounded recent history per metric.

use crate::models::{HistorySnapshot, TrendDirection, TrendSeries};

/// Points kept per series, newest last.
pub const TREND_WINDOW: usize = 8;

/// Changes smaller than this are reported as no change.
const CHANGE_EPSILON: f64 = 1e-6;

/// One series per current metric, built from `history` (oldest first).
///
/// Snapshots missing a metric are skipped rather than zero-filled, so series
/// for different metrics may not line up in time.
pub fn build<'a, I>(history: &[HistorySnapshot], current_metrics: I) -> TrendSeries
where
    I: IntoIterator<Item = &'a str>,
{
    current_metrics
        .into_iter()
        .map(|name| {
            let mut series: Vec<f64> = history
                .iter()
                .filter_map(|snapshot| snapshot.metrics.get(name).copied())
                .filter(|v| v.is_finite())
                .collect();
            if series.len() > TREND_WINDOW {
                series.drain(..series.len() - TREND_WINDOW);
            }
            (name.to_string(), series)
        })
        .collect()
}

/// Difference of the last two points, if both exist and they differ.
pub fn last_change(series: &[f64]) -> Option<f64> {
    match series {
        [.., prev, last] => {
            let delta = last - prev;
            (delta.abs() >= CHANGE_EPSILON).then_some(delta)
        }
        _ => None,
    }
}

pub fn direction(series: &[f64]) -> TrendDirection {
    match last_change(series) {
        Some(d) if d > 0.0 => TrendDirection::Rising,
        Some(_) => TrendDirection::Falling,
        None => TrendDirection::Stable,
    }
}

/// Fewer than two points means no trend can be drawn.
pub fn has_trend(series: &[f64]) -> bool {
    series.len() >= 2
}
