use crate::chart::Renderer;
use crate::config::{ImageFormat, ReportConfig};
use crate::plots::{
    plot_cpu, plot_io, plot_memory, plot_scale, plot_startup, plot_summary, PlotOutput,
};
use crate::report::print_summary;
use crate::theme::Theme;
use anyhow::{anyhow, Result};
use plotters::style::IntoFont;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// A named chart routine of the report
pub struct Stage {
    pub name: &'static str,
    pub plot: fn(&Renderer, &Path) -> PlotOutput,
}

/// Chart routines in the order they run
pub const STAGES: &[Stage] = &[
    Stage {
        name: "startup",
        plot: plot_startup,
    },
    Stage {
        name: "memory",
        plot: plot_memory,
    },
    Stage {
        name: "cpu",
        plot: plot_cpu,
    },
    Stage {
        name: "io",
        plot: plot_io,
    },
    Stage {
        name: "scale",
        plot: plot_scale,
    },
    Stage {
        name: "summary",
        plot: plot_summary,
    },
];

/// What a report run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Every image written, across all output targets
    pub written: Vec<PathBuf>,
    /// Charts left out because their input was missing or empty
    pub skipped: Vec<&'static str>,
    /// Charts that failed while drawing or writing
    pub failed: Vec<&'static str>,
}

/// Fail early when no font is available for chart text; every chart would fail otherwise.
pub fn check_chart_backend() -> Result<()> {
    ("sans-serif", 12)
        .into_font()
        .layout_box("0")
        .map(|_| ())
        .map_err(|err| anyhow!("No usable sans-serif font for chart text: {:?}", err))
}

/// Run every chart routine, print the text summary and list the generated images.
pub fn run(config: &ReportConfig) -> Result<RunSummary> {
    println!("Generating benchmark charts...");
    println!("Results directory: {}", config.results_dir.display());
    println!();

    let renderer = Renderer::from_config(config, Theme::default());
    let mut summary = RunSummary::default();

    for stage in STAGES {
        debug!(chart = stage.name, "Plotting");
        match (stage.plot)(&renderer, &config.results_dir) {
            Ok(Some(paths)) => summary.written.extend(paths),
            Ok(None) => {
                debug!(chart = stage.name, "Skipped (no data)");
                summary.skipped.push(stage.name);
            }
            Err(err) => {
                error!("Failed to plot {}: {:#}", stage.name, err);
                summary.failed.push(stage.name);
            }
        }
    }

    print_summary(
        &config.results_dir,
        renderer.theme(),
        &mut std::io::stdout().lock(),
    )?;

    println!("\nGenerated charts:");
    for path in list_images(&config.results_dir, config.format) {
        println!("  {}", path.display());
    }

    Ok(summary)
}

/// Image files of the given format in `dir`, sorted by path
pub fn list_images(dir: &Path, format: ImageFormat) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(format.extension())
        })
        .collect();
    images.sort();
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let names: Vec<&str> = STAGES.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["startup", "memory", "cpu", "io", "scale", "summary"]);
    }

    #[test]
    fn test_list_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["summary.png", "cpu_comparison.png", "cpu.csv", "notes.svg"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pngs = list_images(dir.path(), ImageFormat::Png);
        assert_eq!(
            pngs,
            vec![
                dir.path().join("cpu_comparison.png"),
                dir.path().join("summary.png")
            ]
        );
        assert_eq!(list_images(dir.path(), ImageFormat::Svg).len(), 1);
        assert!(list_images(&dir.path().join("missing"), ImageFormat::Png).is_empty());
    }

    #[test]
    fn test_run_without_inputs_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            results_dir: dir.path().join("results"),
            images_dir: Some(dir.path().join("images")),
            format: ImageFormat::Png,
        };

        let summary = run(&config).unwrap();
        assert!(summary.written.is_empty());
        assert!(summary.failed.is_empty());
        assert_eq!(summary.skipped.len(), STAGES.len());
        assert!(!dir.path().join("images").exists());
    }
}
