use crate::aggregate::runtime_means;
use crate::loader::{load_table, Category};
use crate::records::{RuntimeValueRow, ScaleReportRow};
use crate::theme::Theme;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Print the text summary: startup and CPU means, then the raw scaling rows.
///
/// Sections whose input file is missing or empty are left out. Means are
/// recomputed from the CSV files rather than shared with the chart routines.
pub fn print_summary<W: Write>(results_dir: &Path, theme: &Theme, out: &mut W) -> Result<()> {
    writeln!(out, "\n{:=<width$}", "", width = RULE_WIDTH)?;
    writeln!(out, "  BENCHMARK SUMMARY")?;
    writeln!(out, "{:=<width$}", "", width = RULE_WIDTH)?;

    let startup = load_table(results_dir, Category::Startup);
    if !startup.is_empty() {
        writeln!(out, "\nStartup Latency:")?;
        for m in runtime_means(&startup.rows::<RuntimeValueRow>()) {
            writeln!(out, "  {:15} {:8.1} ms", theme.label(&m.runtime), m.mean)?;
        }
    }

    let cpu = load_table(results_dir, Category::Cpu);
    if !cpu.is_empty() {
        writeln!(out, "\nCPU (count to 10M):")?;
        for m in runtime_means(&cpu.rows::<RuntimeValueRow>()) {
            writeln!(out, "  {:15} {:8.2} s", theme.label(&m.runtime), m.mean)?;
        }
    }

    let scale = load_table(results_dir, Category::Scale);
    if !scale.is_empty() {
        writeln!(out, "\nScaling:")?;
        for row in scale.rows::<ScaleReportRow>() {
            writeln!(
                out,
                "  {:15} {:>3} containers: {:6.1}s, +{:.0} MB",
                theme.label(&row.runtime),
                row.count,
                row.time_seconds,
                row.memory_mb
            )?;
        }
    }

    writeln!(out, "\n{:=<width$}", "", width = RULE_WIDTH)?;
    Ok(())
}
