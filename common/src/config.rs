use std::{fmt, path::Path, str::FromStr};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::summary::Metric;

pub const DEFAULT_DPI: u32 = 120;
pub const DEFAULT_ALPHA: f64 = 0.8;

/// Styling shared by every chart. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub dpi: u32,
    pub alpha: f64,
    pub read_iops: MetricStyle,
    pub write_iops: MetricStyle,
    pub read_latency: MetricStyle,
    pub write_latency: MetricStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStyle {
    pub color: HexColor,
    pub label: String,
}

impl MetricStyle {
    fn new(color: HexColor, label: &str) -> Self {
        Self {
            color,
            label: label.to_owned(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            alpha: DEFAULT_ALPHA,
            read_iops: MetricStyle::new(HexColor(0x1f, 0x77, 0xb4), "Read IOPS"),
            write_iops: MetricStyle::new(HexColor(0xd6, 0x27, 0x28), "Write IOPS"),
            read_latency: MetricStyle::new(HexColor(0x2c, 0xa0, 0x2c), "Read Latency"),
            write_latency: MetricStyle::new(HexColor(0xff, 0x7f, 0x0e), "Write Latency"),
        }
    }
}

impl ChartConfig {
    /// Loads a YAML chart config, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Reading chart config {}", path.display()))?;
        serde_yml::from_str(&contents)
            .wrap_err_with(|| format!("Parsing chart config {}", path.display()))
    }

    pub fn with_dpi(mut self, dpi: Option<u32>) -> Self {
        if let Some(dpi) = dpi {
            self.dpi = dpi;
        }
        self
    }

    pub fn style(&self, metric: Metric) -> &MetricStyle {
        match metric {
            Metric::ReadIops => &self.read_iops,
            Metric::WriteIops => &self.write_iops,
            Metric::ReadLatency => &self.read_latency,
            Metric::WriteLatency => &self.write_latency,
        }
    }
}

/// An sRGB color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub u8, pub u8, pub u8);

#[derive(Debug, Error, PartialEq)]
pub enum ColorParseError {
    #[error("color {0:?} must look like #rrggbb")]
    Format(String),
    #[error("color {0:?} has a non-hex digit")]
    Digit(String),
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| ColorParseError::Format(s.to_owned()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(s.to_owned()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError::Digit(s.to_owned()))
        };
        Ok(HexColor(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
