//! Gauge, range-bar and sparkline geometry shared by the back-ends.

use std::f64::consts::PI;

use crate::models::{AbnormalStatus, ReferenceBand};
use crate::trends::has_trend;

pub const NEUTRAL_COLOR: &str = "#10b981";
pub const ALERT_COLOR: &str = "#ef4444";

pub const DONUT_SIZE: f64 = 74.0;
pub const DONUT_RADIUS: f64 = 30.0;

pub const SPARK_WIDTH: f64 = 140.0;
pub const SPARK_HEIGHT: f64 = 28.0;
pub const SPARK_PAD: f64 = 3.0;

/// Same color for gauge, marker and sparkline of one metric.
pub fn status_color(status: AbnormalStatus) -> &'static str {
    if status.is_abnormal() {
        ALERT_COLOR
    } else {
        NEUTRAL_COLOR
    }
}

/// Position of `value` inside the band as 0–100. 50 for a zero-width band.
pub fn gauge_percent(value: f64, band: &ReferenceBand) -> f64 {
    let width = band.width();
    if width.is_nan() || width <= 0.0 {
        return 50.0;
    }
    ((value - band.low) / width).clamp(0.0, 1.0) * 100.0
}

/// Donut stroke: `(dash, gap)` along the circumference for a gauge percent.
pub fn donut_dash(percent: f64) -> (f64, f64) {
    let circumference = 2.0 * PI * DONUT_RADIUS;
    let dash = circumference * percent / 100.0;
    (dash, circumference - dash)
}

/// Sparkline vertices, evenly spaced along the width.
///
/// Values are normalized against the series' own min/max. Fewer than two
/// points, or no spread, gives a flat line at mid-height.
pub fn sparkline_points(series: &[f64]) -> Vec<(f64, f64)> {
    let mid = SPARK_HEIGHT / 2.0;
    if !has_trend(series) {
        return vec![(SPARK_PAD, mid), (SPARK_WIDTH - SPARK_PAD, mid)];
    }

    let lo = series.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = hi - lo;
    let step = (SPARK_WIDTH - SPARK_PAD * 2.0) / (series.len() - 1) as f64;
    let usable = SPARK_HEIGHT - SPARK_PAD * 2.0;

    series
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = SPARK_PAD + i as f64 * step;
            let y = if spread > 0.0 {
                SPARK_PAD + usable * (1.0 - (v - lo) / spread)
            } else {
                mid
            };
            (x, y)
        })
        .collect()
}

/// SVG path data (`M x,y L x,y ...`) through the points.
pub fn sparkline_path(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| format!("{}{x:.2},{y:.2}", if i == 0 { "M" } else { "L" }))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> ReferenceBand {
        ReferenceBand::new(13.0, 17.0, "g/dL")
    }

    #[test]
    fn gauge_inside_band() {
        assert_eq!(gauge_percent(15.0, &band()), 50.0);
        assert_eq!(gauge_percent(13.0, &band()), 0.0);
        assert_eq!(gauge_percent(17.0, &band()), 100.0);
    }

    #[test]
    fn gauge_clamps_outside_band() {
        assert_eq!(gauge_percent(9.5, &band()), 0.0);
        assert_eq!(gauge_percent(25.0, &band()), 100.0);
    }

    #[test]
    fn gauge_zero_width_band_defaults_to_half() {
        assert_eq!(gauge_percent(5.0, &ReferenceBand::new(5.0, 5.0, "")), 50.0);
        assert_eq!(gauge_percent(5.0, &ReferenceBand::new(6.0, 5.0, "")), 50.0);
    }

    #[test]
    fn donut_dash_sums_to_circumference() {
        let (dash, gap) = donut_dash(25.0);
        assert!((dash + gap - 2.0 * PI * DONUT_RADIUS).abs() < 1e-9);
        assert!((dash - PI * DONUT_RADIUS / 2.0).abs() < 1e-9);
    }

    #[test]
    fn sparkline_flat_for_short_series() {
        assert_eq!(sparkline_points(&[]), vec![(3.0, 14.0), (137.0, 14.0)]);
        assert_eq!(sparkline_points(&[12.0]), vec![(3.0, 14.0), (137.0, 14.0)]);
    }

    #[test]
    fn sparkline_flat_for_constant_series() {
        let points = sparkline_points(&[5.0, 5.0, 5.0]);
        assert!(points.iter().all(|&(_, y)| y == 14.0));
    }

    #[test]
    fn sparkline_spans_full_height() {
        let points = sparkline_points(&[10.0, 20.0, 15.0]);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], (3.0, 25.0));
        assert_eq!(points[1], (70.0, 3.0));
        assert_eq!(points[2], (137.0, 14.0));
    }

    #[test]
    fn path_format() {
        let path = sparkline_path(&sparkline_points(&[]));
        assert_eq!(path, "M3.00,14.00 L137.00,14.00");
    }

    #[test]
    fn colors_follow_status() {
        assert_eq!(status_color(AbnormalStatus::Normal), NEUTRAL_COLOR);
        assert_eq!(status_color(AbnormalStatus::Low), ALERT_COLOR);
        assert_eq!(status_color(AbnormalStatus::High), ALERT_COLOR);
    }
}
