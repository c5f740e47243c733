use anyhow::Result;
use clap::{Parser, ValueEnum};
use container_bench_report::driver::{check_chart_backend, run};
use container_bench_report::{ImageFormat, ReportConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "container-bench-report")]
#[command(about = "Render container runtime benchmark results as charts and a text summary")]
struct Cli {
    /// Directory containing the benchmark CSV files; charts are written here too
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Second directory that receives a copy of every chart
    #[arg(long, default_value = "../images")]
    images_dir: PathBuf,

    /// Only write charts to the results directory
    #[arg(long, default_value = "false")]
    no_images: bool,

    /// Image format of the charts
    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Log dropped rows and skipped charts
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for ImageFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Svg => ImageFormat::Svg,
        }
    }
}

/// `RUST_LOG` drives the filter; `--verbose` adds a debug directive for this crate on top.
fn log_filter(env: Option<&str>, verbose: bool) -> EnvFilter {
    let mut filter = env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("container_bench_report=warn"));
    if verbose {
        if let Ok(directive) = "container_bench_report=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn init_logging(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(env.as_deref(), verbose);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    check_chart_backend()?;

    let config = ReportConfig {
        results_dir: cli.results_dir,
        images_dir: (!cli.no_images).then_some(cli.images_dir),
        format: cli.format.into(),
    };

    run(&config)?;
    Ok(())
}
