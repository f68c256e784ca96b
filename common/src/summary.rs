use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One line of the summary log, a flattened projection of a single fio run.
///
/// Records are written once and never rewritten. `time` and `commit` are
/// informational: readers that only chart the series do not require them.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub timestamp: i64,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub commit: String,
    pub read_iops: f64,
    pub read_latency_ns: f64,
    pub write_iops: f64,
    pub write_latency_ns: f64,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("missing or mistyped field: {0}")]
    Field(#[source] serde_json::Error),
}

impl SummaryRecord {
    /// Parses one summary log line. Surrounding whitespace is ignored.
    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let value: serde_json::Value =
            serde_json::from_str(line.trim()).map_err(RecordError::Json)?;
        serde_json::from_value(value).map_err(RecordError::Field)
    }

    /// Compact single-line JSON, without the trailing newline.
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ReadIops => self.read_iops,
            Metric::WriteIops => self.write_iops,
            Metric::ReadLatency => self.read_latency_ns,
            Metric::WriteLatency => self.write_latency_ns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ReadIops,
    WriteIops,
    ReadLatency,
    WriteLatency,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::ReadIops,
        Metric::WriteIops,
        Metric::ReadLatency,
        Metric::WriteLatency,
    ];
    pub const IOPS: [Metric; 2] = [Metric::ReadIops, Metric::WriteIops];
    pub const LATENCY: [Metric; 2] = [Metric::ReadLatency, Metric::WriteLatency];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::ReadIops => "read_iops",
            Metric::WriteIops => "write_iops",
            Metric::ReadLatency => "read_latency",
            Metric::WriteLatency => "write_latency",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::ReadIops | Metric::WriteIops => "IOPS",
            Metric::ReadLatency | Metric::WriteLatency => "ns",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}
