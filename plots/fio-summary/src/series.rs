use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use common::summary::{Metric, SummaryRecord};
use thiserror::Error;
use tracing::warn;

/// The whole summary log held in memory as parallel columns.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Series {
    pub times: Vec<DateTime<Local>>,
    pub read_iops: Vec<f64>,
    pub read_latency: Vec<f64>,
    pub write_iops: Vec<f64>,
    pub write_latency: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("summary log {0} not found")]
    NotFound(PathBuf),
    #[error("summary log {0} has no usable records")]
    Empty(PathBuf),
    #[error("failed to read summary log {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Series {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::ReadIops => &self.read_iops,
            Metric::WriteIops => &self.write_iops,
            Metric::ReadLatency => &self.read_latency,
            Metric::WriteLatency => &self.write_latency,
        }
    }

    /// Appends a record. Returns `false` when its timestamp cannot be
    /// represented as a date.
    pub fn push(&mut self, record: &SummaryRecord) -> bool {
        let Some(time) = DateTime::from_timestamp(record.timestamp, 0) else {
            return false;
        };
        self.times.push(time.with_timezone(&Local));
        self.read_iops.push(record.read_iops);
        self.read_latency.push(record.read_latency_ns);
        self.write_iops.push(record.write_iops);
        self.write_latency.push(record.write_latency_ns);
        true
    }

    /// Reads summary log lines, skipping any that do not parse.
    ///
    /// Returns the series and the number of skipped lines. Blank lines are
    /// ignored without being counted.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<(Self, usize)> {
        let mut series = Series::default();
        let mut skipped = 0;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match SummaryRecord::parse_line(&line) {
                Ok(record) => {
                    if !series.push(&record) {
                        warn!(
                            "Skipped line {}: timestamp {} out of range",
                            index + 1,
                            record.timestamp
                        );
                        skipped += 1;
                    }
                }
                Err(err) => {
                    warn!("Skipped line {}: {err}", index + 1);
                    skipped += 1;
                }
            }
        }
        Ok((series, skipped))
    }

    pub fn last_time(&self) -> Option<&DateTime<Local>> {
        self.times.last()
    }

    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.values(metric).last().copied()
    }

    pub fn stats(&self, metric: Metric) -> Option<MetricStats> {
        let values = self.values(metric);
        if values.is_empty() {
            return None;
        }
        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );
        Some(MetricStats {
            min,
            max,
            mean: sum / values.len() as f64,
        })
    }
}

/// Loads the full summary log. Lines that do not parse are logged and
/// skipped; a log without any usable record is an error.
pub fn load_series(path: &Path) -> Result<Series, LoadError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let (series, skipped) =
        Series::from_reader(BufReader::new(file)).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if skipped > 0 {
        warn!("{skipped} line(s) of {} were skipped", path.display());
    }
    if series.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(series)
}
