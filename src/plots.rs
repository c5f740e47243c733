//! One routine per report. Each loads its CSV, aggregates it and hands a chart
//! to the [`Renderer`]; when there is nothing to plot it returns `Ok(None)`
//! without touching the output directories.

use crate::aggregate::{io_means, memory_overhead, runtime_means, scale_series, RuntimeMean};
use crate::chart::{IoChart, MemoryChart, Renderer, RuntimeBarChart, ScaleChart, SummaryChart};
use crate::loader::{load_table, Category};
use crate::records::{IoRow, MemoryRow, RuntimeValueRow, ScaleRow};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths written by a plot routine, or `None` when the chart was skipped
pub type PlotOutput = Result<Option<Vec<PathBuf>>>;

/// Means of a `runtime,value` file, or `None` if it has no usable rows
pub fn load_runtime_means(results_dir: &Path, category: Category) -> Option<Vec<RuntimeMean>> {
    let table = load_table(results_dir, category);
    if table.is_empty() {
        return None;
    }
    let means = runtime_means(&table.rows::<RuntimeValueRow>());
    if means.is_empty() {
        debug!(category = category.name(), "No parseable rows");
        return None;
    }
    Some(means)
}

pub fn plot_startup(renderer: &Renderer, results_dir: &Path) -> PlotOutput {
    let Some(means) = load_runtime_means(results_dir, Category::Startup) else {
        return Ok(None);
    };

    let chart = RuntimeBarChart {
        file_stem: "startup_comparison",
        title: "Startup Latency",
        y_desc: "Time (ms)",
        means,
        value_format: |v| format!("{:.1} ms", v),
    };
    renderer.save(&chart).map(Some)
}

pub fn plot_memory(renderer: &Renderer, results_dir: &Path) -> PlotOutput {
    let table = load_table(results_dir, Category::Memory);
    if table.is_empty() {
        return Ok(None);
    }

    let overhead = memory_overhead(&table.rows::<MemoryRow>());
    if overhead.is_empty() {
        debug!("No overhead metrics in memory.csv");
        return Ok(None);
    }

    renderer.save(&MemoryChart { overhead }).map(Some)
}

pub fn plot_cpu(renderer: &Renderer, results_dir: &Path) -> PlotOutput {
    let Some(means) = load_runtime_means(results_dir, Category::Cpu) else {
        return Ok(None);
    };

    let chart = RuntimeBarChart {
        file_stem: "cpu_comparison",
        title: "CPU Benchmark (count to 10M)",
        y_desc: "Time (seconds)",
        means,
        value_format: |v| format!("{:.2}s", v),
    };
    renderer.save(&chart).map(Some)
}

pub fn plot_io(renderer: &Renderer, results_dir: &Path) -> PlotOutput {
    let table = load_table(results_dir, Category::Io);
    if table.is_empty() {
        return Ok(None);
    }

    let means = io_means(&table.rows::<IoRow>());
    if means.is_empty() {
        debug!("No parseable rows in io.csv");
        return Ok(None);
    }

    renderer.save(&IoChart { means }).map(Some)
}

pub fn plot_scale(renderer: &Renderer, results_dir: &Path) -> PlotOutput {
    let table = load_table(results_dir, Category::Scale);
    if table.is_empty() {
        return Ok(None);
    }

    let series = scale_series(&table.rows::<ScaleRow>());
    if series.is_empty() {
        debug!("No parseable rows in scale.csv");
        return Ok(None);
    }

    renderer.save(&ScaleChart { series }).map(Some)
}

/// Startup and CPU side by side; skipped only when both are empty.
pub fn plot_summary(renderer: &Renderer, results_dir: &Path) -> PlotOutput {
    let chart = SummaryChart {
        startup: load_runtime_means(results_dir, Category::Startup).unwrap_or_default(),
        cpu: load_runtime_means(results_dir, Category::Cpu).unwrap_or_default(),
    };
    if chart.is_empty() {
        return Ok(None);
    }

    renderer.save(&chart).map(Some)
}
