use crate::records::{IoRow, MemoryRow, RuntimeValueRow, ScaleRow};
use crate::runtime::sort_runtimes;
use std::borrow::Borrow;
use std::collections::HashMap;

/// Access modes of the disk I/O benchmark, in display order
pub const IO_MODES: &[&str] = &["direct", "overlay", "volume"];

/// Values grouped by key, keeping the order in which keys were first seen
#[derive(Debug, Clone, PartialEq)]
pub struct Groups<K, V> {
    entries: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for Groups<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> Groups<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: K, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.entries
            .iter()
            .find(|(k, _)| Borrow::<Q>::borrow(k) == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: PartialEq + Clone> Groups<K, f64> {
    /// Mean of every group, in first-seen order
    pub fn means(&self) -> Vec<(K, f64)> {
        self.entries
            .iter()
            .filter_map(|(k, values)| mean(values).map(|m| (k.clone(), m)))
            .collect()
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Group `items` by `key`, collecting `value` for each item
pub fn group_values<T, K, FK, FV>(items: &[T], key: FK, value: FV) -> Groups<K, f64>
where
    K: PartialEq,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> f64,
{
    let mut groups = Groups::new();
    for item in items {
        groups.push(key(item), value(item));
    }
    groups
}

/// Mean of one runtime's measurements
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeMean {
    pub runtime: String,
    pub mean: f64,
}

/// Per-runtime means, bare first, then docker and podman, then anything else
pub fn runtime_means(rows: &[RuntimeValueRow]) -> Vec<RuntimeMean> {
    let groups = group_values(rows, |r| r.runtime.clone(), |r| r.value);
    let mut means: Vec<RuntimeMean> = groups
        .means()
        .into_iter()
        .map(|(runtime, mean)| RuntimeMean { runtime, mean })
        .collect();
    sort_runtimes(&mut means, |m| m.runtime.as_str());
    means
}

/// Memory overhead per runtime, bucketed by container count
#[derive(Debug, Clone, Default)]
pub struct MemoryOverhead {
    counts: Vec<String>,
    by_runtime: Vec<(String, HashMap<String, f64>)>,
}

impl MemoryOverhead {
    /// Container count labels, in ascending numeric order
    pub fn counts(&self) -> &[String] {
        &self.counts
    }

    pub fn has_runtime(&self, runtime: &str) -> bool {
        self.by_runtime.iter().any(|(rt, _)| rt == runtime)
    }

    /// One value per count label; a count without a sample reads as 0.
    pub fn values(&self, runtime: &str) -> Option<Vec<f64>> {
        let (_, samples) = self.by_runtime.iter().find(|(rt, _)| rt == runtime)?;
        Some(
            self.counts
                .iter()
                .map(|c| samples.get(c).copied().unwrap_or(0.0))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.by_runtime.is_empty()
    }
}

/// Extract overhead samples from `memory.csv` rows.
///
/// Only metrics naming an overhead count. A later row for the same runtime and
/// count replaces the earlier one.
pub fn memory_overhead(rows: &[MemoryRow]) -> MemoryOverhead {
    let mut overhead = MemoryOverhead::default();

    for row in rows.iter().filter(|r| r.is_overhead()) {
        let count = row.count_label().to_string();
        if !overhead.counts.contains(&count) {
            overhead.counts.push(count.clone());
        }

        match overhead
            .by_runtime
            .iter_mut()
            .find(|(rt, _)| *rt == row.runtime)
        {
            Some((_, samples)) => {
                samples.insert(count, row.value);
            }
            None => {
                let samples = HashMap::from([(count, row.value)]);
                overhead.by_runtime.push((row.runtime.clone(), samples));
            }
        }
    }

    // Non-numeric labels sort as 0.
    overhead.counts.sort_by(|a, b| {
        let key = |c: &str| c.parse::<u64>().unwrap_or(0);
        key(a.as_str())
            .cmp(&key(b.as_str()))
            .then_with(|| a.cmp(b))
    });
    overhead
}

/// Mean throughput per (runtime, mode)
#[derive(Debug, Clone, Default)]
pub struct IoMeans {
    groups: Groups<(String, String), f64>,
}

impl IoMeans {
    pub fn get(&self, runtime: &str, mode: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|((rt, m), _)| rt == runtime && m == mode)
            .and_then(|(_, values)| mean(values))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn io_means(rows: &[IoRow]) -> IoMeans {
    IoMeans {
        groups: group_values(
            rows,
            |r| (r.runtime.clone(), r.mode.clone()),
            |r| r.mb_per_sec,
        ),
    }
}

/// One sampled container count of the scaling benchmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePoint {
    pub count: u32,
    pub memory_mb: f64,
    pub time_seconds: f64,
}

/// Scaling samples per runtime, in file order
pub fn scale_series(rows: &[ScaleRow]) -> Groups<String, ScalePoint> {
    let mut groups = Groups::new();
    for row in rows {
        groups.push(
            row.runtime.clone(),
            ScalePoint {
                count: row.count,
                memory_mb: row.memory_mb,
                time_seconds: row.time_seconds,
            },
        );
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rv(runtime: &str, value: f64) -> RuntimeValueRow {
        RuntimeValueRow {
            runtime: runtime.to_string(),
            value,
        }
    }

    fn mem(runtime: &str, metric: &str, value: f64) -> MemoryRow {
        MemoryRow {
            runtime: runtime.to_string(),
            metric: metric.to_string(),
            value,
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(mean(&[1.5]), Some(1.5));
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let mut groups: Groups<String, f64> = Groups::new();
        groups.push("podman".to_string(), 1.0);
        groups.push("bare".to_string(), 2.0);
        groups.push("podman".to_string(), 3.0);

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["podman", "bare"]
        );
        assert_eq!(groups.get("podman"), Some(&[1.0, 3.0][..]));
        assert!(!groups.contains_key("docker"));
    }

    #[test]
    fn test_runtime_means_startup_scenario() {
        let rows = vec![rv("docker", 100.0), rv("bare", 2.0), rv("bare", 4.0)];
        let means = runtime_means(&rows);
        assert_eq!(
            means,
            vec![
                RuntimeMean {
                    runtime: "bare".to_string(),
                    mean: 3.0
                },
                RuntimeMean {
                    runtime: "docker".to_string(),
                    mean: 100.0
                },
            ]
        );
    }

    #[test]
    fn test_runtime_means_unknown_runtimes_last() {
        let rows = vec![rv("kata", 1.0), rv("podman", 2.0), rv("bare", 3.0)];
        let order: Vec<String> = runtime_means(&rows).into_iter().map(|m| m.runtime).collect();
        assert_eq!(order, vec!["bare", "podman", "kata"]);
    }

    #[test]
    fn test_memory_overhead() {
        let rows = vec![
            mem("docker", "containers_10_overhead_mb", 120.0),
            mem("docker", "containers_5_overhead_mb", 60.0),
            mem("docker", "containers_5_total_mb", 900.0),
            mem("podman", "containers_5_overhead_mb", 40.0),
            mem("podman", "containers_5_overhead_mb", 45.0),
        ];
        let overhead = memory_overhead(&rows);

        assert_eq!(overhead.counts(), &["5".to_string(), "10".to_string()]);
        assert_eq!(overhead.values("docker"), Some(vec![60.0, 120.0]));
        // Missing bucket reads as zero, last sample wins.
        assert_eq!(overhead.values("podman"), Some(vec![45.0, 0.0]));
        assert_eq!(overhead.values("bare"), None);
    }

    #[test]
    fn test_memory_overhead_ignores_other_metrics() {
        let rows = vec![mem("docker", "containers_5_rss_mb", 1.0)];
        assert!(memory_overhead(&rows).is_empty());
    }

    #[test]
    fn test_memory_overhead_unknown_count_sorts_first() {
        let rows = vec![
            mem("docker", "containers_3_overhead", 3.0),
            mem("docker", "overhead_mb", 9.0),
        ];
        let overhead = memory_overhead(&rows);
        assert_eq!(overhead.counts(), &["?".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_io_means() {
        let rows = vec![
            IoRow {
                runtime: "docker".to_string(),
                mode: "overlay".to_string(),
                mb_per_sec: 300.0,
            },
            IoRow {
                runtime: "docker".to_string(),
                mode: "overlay".to_string(),
                mb_per_sec: 500.0,
            },
            IoRow {
                runtime: "bare".to_string(),
                mode: "direct".to_string(),
                mb_per_sec: 900.0,
            },
        ];
        let means = io_means(&rows);
        assert_eq!(means.get("docker", "overlay"), Some(400.0));
        assert_eq!(means.get("bare", "direct"), Some(900.0));
        assert_eq!(means.get("bare", "volume"), None);
    }

    #[test]
    fn test_scale_series_keeps_file_order() {
        let row = |runtime: &str, count, memory_mb| ScaleRow {
            runtime: runtime.to_string(),
            count,
            memory_mb,
            time_seconds: 1.0,
        };
        let rows = vec![row("docker", 10, 200.0), row("podman", 1, 5.0), row("docker", 1, 20.0)];
        let series = scale_series(&rows);

        let docker: Vec<u32> = series.get("docker").unwrap().iter().map(|p| p.count).collect();
        assert_eq!(docker, vec![10, 1]);
        assert_eq!(series.get("podman").unwrap()[0].memory_mb, 5.0);
    }

    mod properties {
        use super::*;
        use crate::runtime::priority;
        use proptest::prelude::*;

        fn runtime_name() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("bare".to_string()),
                Just("docker".to_string()),
                Just("podman".to_string()),
                "[a-z]{3,6}",
            ]
        }

        proptest! {
            #[test]
            fn mean_is_sum_over_count(values in prop::collection::vec(-1.0e6..1.0e6_f64, 1..50)) {
                let expected = values.iter().sum::<f64>() / values.len() as f64;
                let got = mean(&values).unwrap();
                prop_assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            }

            #[test]
            fn runtime_means_are_ordered_and_complete(
                rows in prop::collection::vec((runtime_name(), 0.0..1000.0_f64), 0..40)
            ) {
                let rows: Vec<RuntimeValueRow> = rows
                    .into_iter()
                    .map(|(runtime, value)| RuntimeValueRow { runtime, value })
                    .collect();
                let means = runtime_means(&rows);

                let priorities: Vec<usize> = means.iter().map(|m| priority(&m.runtime)).collect();
                prop_assert!(priorities.windows(2).all(|w| w[0] <= w[1]));

                for m in &means {
                    let values: Vec<f64> = rows
                        .iter()
                        .filter(|r| r.runtime == m.runtime)
                        .map(|r| r.value)
                        .collect();
                    prop_assert!(!values.is_empty());
                    prop_assert_eq!(Some(m.mean), mean(&values));
                }
            }
        }
    }
}
