use anyhow::{Context, Result};
use std::path::PathBuf;

/// Encoding of the rendered charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// A directory every chart gets written into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
}

impl OutputTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the directory if it doesn't exist yet.
    pub fn ensure_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))
    }

    pub fn path_for(&self, file_stem: &str, format: ImageFormat) -> PathBuf {
        self.dir.join(format!("{}.{}", file_stem, format.extension()))
    }
}

/// Configuration for a report run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory holding the benchmark CSV files; charts are written here too
    pub results_dir: PathBuf,
    /// Extra copy of every chart for the static site, if any
    pub images_dir: Option<PathBuf>,
    pub format: ImageFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            images_dir: Some(PathBuf::from("../images")),
            format: ImageFormat::Png,
        }
    }
}

impl ReportConfig {
    /// Output directories in write order: results first, then images
    pub fn targets(&self) -> Vec<OutputTarget> {
        let mut targets = vec![OutputTarget::new(&self.results_dir)];
        if let Some(images_dir) = &self.images_dir {
            if images_dir != &self.results_dir {
                targets.push(OutputTarget::new(images_dir));
            }
        }
        targets
    }
}
