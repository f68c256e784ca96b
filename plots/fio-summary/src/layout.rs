//! Chart geometry that adapts to the number of points in the series.

use chrono::{DateTime, TimeZone};

/// Bar width multiplier for the standalone two-series charts.
pub const GROUPED_BAR_SCALE: f64 = 0.8;
/// Bar width multiplier for the stacked summary chart.
pub const SUMMARY_BAR_SCALE: f64 = 0.7;

/// Canvas inches added per point once the minimum width is exceeded.
pub const INCHES_PER_POINT: f64 = 0.6;

/// Above this many points labels drop the date.
const LONG_LABEL_LIMIT: usize = 15;
/// Above this many points only every n-th label is printed.
const THINNING_LIMIT: usize = 30;
/// Roughly how many labels remain once thinning kicks in.
const TARGET_LABELS: usize = 15;

/// Logical width of one bar for `points` time points, in x-axis units
/// (one unit per point).
pub fn bar_width(points: usize) -> f64 {
    match points {
        0..=5 => 0.35,
        6..=15 => 0.25,
        16..=30 => 0.15,
        n => (6.0 / n as f64).max(0.1),
    }
}

/// Horizontal extent of the bar drawn for `slot` (0 = left series,
/// 1 = right series) at point `index`.
///
/// Bars are centered at `index + slot * width - width / 2`, so the two
/// series of a group sit edge to edge around the point's tick.
pub fn bar_span(index: usize, slot: usize, width: f64) -> (f64, f64) {
    let center = index as f64 + slot as f64 * width - width / 2.0;
    (center - width / 2.0, center + width / 2.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    /// Date and time on two lines.
    DateTime,
    /// Time of day only.
    Time,
}

impl LabelFormat {
    pub fn for_points(points: usize) -> Self {
        if points > LONG_LABEL_LIMIT {
            LabelFormat::Time
        } else {
            LabelFormat::DateTime
        }
    }

    pub fn pattern(&self) -> &'static str {
        match self {
            LabelFormat::DateTime => "%Y-%m-%d\n%H:%M:%S",
            LabelFormat::Time => "%H:%M:%S",
        }
    }
}

/// Distance between printed labels. Every position keeps its slot; the
/// ones in between are left blank.
pub fn label_step(points: usize) -> usize {
    if points > THINNING_LIMIT {
        points.div_ceil(TARGET_LABELS)
    } else {
        1
    }
}

pub fn time_labels<Tz>(times: &[DateTime<Tz>]) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let format = LabelFormat::for_points(times.len()).pattern();
    let step = label_step(times.len());
    times
        .iter()
        .enumerate()
        .map(|(i, time)| {
            if i % step == 0 {
                time.format(format).to_string()
            } else {
                String::new()
            }
        })
        .collect()
}

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// A canvas at least `min_width` wide that grows with the point count.
    pub fn for_points(points: usize, min_width: f64, height: f64) -> Self {
        Self {
            width: min_width.max(points as f64 * INCHES_PER_POINT),
            height,
        }
    }

    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let dpi = dpi as f64;
        (
            (self.width * dpi).round() as u32,
            (self.height * dpi).round() as u32,
        )
    }
}

/// Converts a font size in points to pixels at `dpi`.
pub fn font_px(points: f64, dpi: u32) -> f64 {
    points * dpi as f64 / 72.0
}
