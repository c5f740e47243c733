use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Why a CSV row was left out of the aggregates
#[derive(Debug, Error)]
pub enum RowError {
    #[error("row {row}: {source}")]
    Malformed {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("row {row} does not exist")]
    OutOfRange { row: usize },
}

/// Measurements must be finite; `inf` and `NaN` parse as `f64` but can't be plotted.
fn finite<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(D::Error::custom(format!("non-finite value {}", value)))
    }
}

/// One measurement per row: `startup.csv` (ms) and `cpu.csv` (seconds)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuntimeValueRow {
    pub runtime: String,
    #[serde(deserialize_with = "finite")]
    pub value: f64,
}

/// `memory.csv`: `metric` is a name such as `containers_5_overhead_mb`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemoryRow {
    pub runtime: String,
    pub metric: String,
    #[serde(deserialize_with = "finite")]
    pub value: f64,
}

impl MemoryRow {
    pub fn is_overhead(&self) -> bool {
        self.metric.contains("overhead")
    }

    /// Container count embedded in the metric name, or `?` when the name is too short.
    pub fn count_label(&self) -> &str {
        let parts: Vec<&str> = self.metric.split('_').collect();
        if parts.len() >= 3 {
            parts[1]
        } else {
            "?"
        }
    }
}

/// `io.csv`: write throughput for one access mode
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IoRow {
    pub runtime: String,
    pub mode: String,
    #[serde(deserialize_with = "finite")]
    pub mb_per_sec: f64,
}

/// `scale.csv`: totals after starting `count` containers
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScaleRow {
    pub runtime: String,
    pub count: u32,
    #[serde(deserialize_with = "finite")]
    pub memory_mb: f64,
    #[serde(deserialize_with = "finite")]
    pub time_seconds: f64,
}

/// `scale.csv` as printed in the text summary: the count is echoed verbatim
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScaleReportRow {
    pub runtime: String,
    pub count: String,
    #[serde(deserialize_with = "finite")]
    pub memory_mb: f64,
    #[serde(deserialize_with = "finite")]
    pub time_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(metric: &str) -> MemoryRow {
        MemoryRow {
            runtime: "docker".to_string(),
            metric: metric.to_string(),
            value: 1.0,
        }
    }

    #[test]
    fn test_count_label() {
        assert_eq!(memory("containers_5_overhead_mb").count_label(), "5");
        assert_eq!(memory("containers_20_overhead").count_label(), "20");
        assert_eq!(memory("overhead_mb").count_label(), "?");
    }

    #[test]
    fn test_is_overhead() {
        assert!(memory("containers_5_overhead_mb").is_overhead());
        assert!(!memory("containers_5_total_mb").is_overhead());
    }
}
