//! Bar charts of the fio summary log: read/write IOPS and latency over time.

use std::{
    fmt::Write as _,
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use common::{config::ChartConfig, summary::Metric};
use eyre::{Context, Result};
use tracing::{error, info};

pub mod layout;
pub mod render;
pub mod series;

use layout::{Canvas, GROUPED_BAR_SCALE, SUMMARY_BAR_SCALE, bar_width, time_labels};
use render::{ChartData, IOPS_PANEL, LATENCY_PANEL, render_grouped, render_summary};
use series::{Series, load_series};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    IopsGrouped,
    LatencyGrouped,
    Summary,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::IopsGrouped,
        ChartKind::LatencyGrouped,
        ChartKind::Summary,
    ];

    pub fn filename(&self) -> &'static str {
        match self {
            ChartKind::IopsGrouped => "iops_grouped.png",
            ChartKind::LatencyGrouped => "latency_grouped.png",
            ChartKind::Summary => "fio_summary.png",
        }
    }

    /// Canvas for `points` bars, in inches.
    pub fn canvas(&self, points: usize) -> Canvas {
        match self {
            ChartKind::IopsGrouped | ChartKind::LatencyGrouped => {
                Canvas::for_points(points, 12.0, 7.0)
            }
            ChartKind::Summary => Canvas::for_points(points, 16.0, 12.0),
        }
    }

    /// Rendered bar width: the logical width narrowed so adjacent groups
    /// stay apart.
    pub fn bar_width(&self, points: usize) -> f64 {
        let scale = match self {
            ChartKind::IopsGrouped | ChartKind::LatencyGrouped => GROUPED_BAR_SCALE,
            ChartKind::Summary => SUMMARY_BAR_SCALE,
        };
        bar_width(points) * scale
    }
}

/// Renders one chart kind for an already loaded series.
pub fn render_chart(
    kind: ChartKind,
    series: &Series,
    config: &ChartConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    let labels = time_labels(&series.times);
    let data = ChartData {
        series,
        labels: &labels,
        config,
    };
    let points = series.len();
    let path = output_dir.join(kind.filename());
    match kind {
        ChartKind::IopsGrouped => render_grouped(
            &data,
            &IOPS_PANEL,
            kind.bar_width(points),
            kind.canvas(points),
            &path,
        ),
        ChartKind::LatencyGrouped => render_grouped(
            &data,
            &LATENCY_PANEL,
            kind.bar_width(points),
            kind.canvas(points),
            &path,
        ),
        ChartKind::Summary => {
            render_summary(&data, kind.bar_width(points), kind.canvas(points), &path)
        }
    }
    .wrap_err_with(|| format!("Rendering {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(path)
}

/// Loads the summary log and writes all three charts into `output_dir`.
///
/// A log that is missing, empty or unreadable is reported and leaves no
/// charts behind; it is not an error for the caller. Failing to create the
/// output directory or to render a chart is.
pub fn visualize(input: &Path, output_dir: &Path, config: &ChartConfig) -> Result<Vec<PathBuf>> {
    create_dir_all(output_dir)
        .wrap_err_with(|| format!("Creating output directory {}", output_dir.display()))?;

    let series = match load_series(input) {
        Ok(series) => series,
        Err(err) => {
            error!("{err}");
            return Ok(Vec::new());
        }
    };
    info!("Loaded {} records from {}", series.len(), input.display());

    ChartKind::ALL
        .iter()
        .map(|kind| render_chart(*kind, &series, config, output_dir))
        .collect()
}

/// Short text description of the series: record count, last update, the
/// latest values and per-metric statistics.
pub fn describe(series: &Series) -> String {
    let mut out = String::new();
    let last_update = series
        .last_time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "no data".to_owned());
    let _ = writeln!(out, "Records: {} | Last update: {last_update}", series.len());
    for metric in Metric::ALL {
        let (Some(latest), Some(stats)) = (series.latest(metric), series.stats(metric)) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{metric:<14} latest {latest:>14.2} {unit:<4} mean {:>14.2}  min {:>14.2}  max {:>14.2}",
            stats.mean,
            stats.min,
            stats.max,
            unit = metric.unit(),
        );
    }
    out
}

/// Loads the summary log and returns its description, or `None` after
/// logging why the log could not be used.
pub fn info(input: &Path) -> Option<String> {
    match load_series(input) {
        Ok(series) => Some(describe(&series)),
        Err(err) => {
            error!("{err}");
            None
        }
    }
}
