use serde::{Deserialize, Serialize};

/// The parts of fio's `--output-format=json` document that the summary log
/// draws on. Unknown keys are ignored.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FioResult {
    #[serde(rename = "fio version")]
    pub fio_version: Option<String>,
    pub timestamp: i64,
    pub timestamp_ms: Option<i64>,
    pub time: String,
    pub jobs: Vec<Job>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub jobname: Option<String>,
    pub read: Direction,
    pub write: Direction,
}

/// Per-direction statistics of a job (`read` or `write`).
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub iops_mean: f64,
    pub lat_ns: LatNs,
    pub bw_mean: Option<f64>,
    pub iops_stddev: Option<f64>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatNs {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub mean: f64,
    pub stddev: Option<f64>,
    #[serde(rename = "N")]
    pub n: Option<i64>,
}
