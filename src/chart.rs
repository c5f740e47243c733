use crate::aggregate::{Groups, IoMeans, MemoryOverhead, RuntimeMean, ScalePoint, IO_MODES};
use crate::config::{ImageFormat, OutputTarget, ReportConfig};
use crate::runtime::{CONTAINER_RUNTIMES, KNOWN_RUNTIMES};
use crate::theme::Theme;
use anyhow::{bail, Context, Result};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::ops::Range;
use std::path::PathBuf;

// Font sizes, in pixels at 150 dpi
const TITLE_FONT_SIZE: f64 = 30.0;
const AXIS_LABEL_FONT_SIZE: u32 = 24;
const TICK_LABEL_FONT_SIZE: u32 = 20;
const LEGEND_FONT_SIZE: u32 = 20;
const DATA_LABEL_FONT_SIZE: u32 = 20;

const MARGIN: u32 = 20;
const X_LABEL_AREA_SIZE: u32 = 60;
const Y_LABEL_AREA_SIZE: u32 = 90;

/// Figure sizes: 8x5, 10x5 and 14x5 inches at 150 dpi
pub const SINGLE_SIZE: (u32, u32) = (1200, 750);
pub const GROUPED_SIZE: (u32, u32) = (1500, 750);
pub const DUAL_SIZE: (u32, u32) = (2100, 750);

type Cartesian = Cartesian2d<RangedCoordf64, RangedCoordf64>;

/// A chart that can be drawn onto any plotters backend
pub trait Chart {
    /// Output file name without extension
    fn file_stem(&self) -> &'static str;

    /// Image size in pixels
    fn size(&self) -> (u32, u32);

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// Writes charts to every output target with a shared theme
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    targets: Vec<OutputTarget>,
    format: ImageFormat,
}

impl Renderer {
    pub fn new(theme: Theme, targets: Vec<OutputTarget>, format: ImageFormat) -> Self {
        Self {
            theme,
            targets,
            format,
        }
    }

    pub fn from_config(config: &ReportConfig, theme: Theme) -> Self {
        Self::new(theme, config.targets(), config.format)
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn targets(&self) -> &[OutputTarget] {
        &self.targets
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Render `chart` once per output target and return the written paths.
    pub fn save<C: Chart>(&self, chart: &C) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            target.ensure_exists()?;
            let path = target.path_for(chart.file_stem(), self.format);
            let rendered = match self.format {
                ImageFormat::Png => {
                    let root = BitMapBackend::new(&path, chart.size()).into_drawing_area();
                    render(root, chart, &self.theme)
                }
                ImageFormat::Svg => {
                    let root = SVGBackend::new(&path, chart.size()).into_drawing_area();
                    render(root, chart, &self.theme)
                }
            };
            rendered.with_context(|| format!("Failed to render {}", path.display()))?;

            println!("  Saved: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

/// Draw and flush; the drawing area (and its pixel buffer) is released on return.
fn render<DB, C>(root: DrawingArea<DB, Shift>, chart: &C, theme: &Theme) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    C: Chart,
{
    chart.draw(&root, theme)?;
    root.present()?;
    Ok(())
}

fn title_font(theme: &Theme) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, TITLE_FONT_SIZE, FontStyle::Bold).color(&theme.text)
}

fn font(size: u32, theme: &Theme) -> TextStyle<'static> {
    ("sans-serif", size).into_font().color(&theme.text)
}

/// Y range with headroom for the value labels drawn above bars.
///
/// Fails when a bound is not finite; plotters can't lay out such an axis.
fn value_range(values: impl IntoIterator<Item = f64>) -> Result<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let hi = if hi > lo { hi * 1.15 } else { lo + 1.0 };
    if !lo.is_finite() || !hi.is_finite() {
        bail!("Value axis out of range: {}..{}", lo, hi);
    }
    Ok(lo..hi)
}

fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if idx >= 0.0 && (x - idx).abs() < 0.3 {
        categories.get(idx as usize).cloned().unwrap_or_default()
    } else {
        String::new()
    }
}

/// Axis text of one panel
struct Axes<'s> {
    title: &'s str,
    y_desc: &'s str,
    x_desc: Option<&'s str>,
}

fn style_mesh<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian>,
    theme: &Theme,
    axes: &Axes,
    x_labels: usize,
    x_formatter: &dyn Fn(&f64) -> String,
    disable_x_mesh: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    chart.plotting_area().fill(&theme.panel)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(x_labels)
        .x_label_formatter(x_formatter)
        .y_desc(axes.y_desc)
        .axis_style(theme.edge)
        .bold_line_style(theme.edge.mix(0.8))
        .light_line_style(theme.edge.mix(0.3))
        .label_style(font(TICK_LABEL_FONT_SIZE, theme))
        .axis_desc_style(font(AXIS_LABEL_FONT_SIZE, theme));
    if disable_x_mesh {
        mesh.disable_x_mesh();
    }
    if let Some(x_desc) = axes.x_desc {
        mesh.x_desc(x_desc);
    }
    mesh.draw()?;
    Ok(())
}

/// Panel with one x slot per category, centred on 0, 1, 2, ...
fn category_chart<'a, DB>(
    area: &'a DrawingArea<DB, Shift>,
    theme: &Theme,
    axes: &Axes,
    categories: &[String],
    y_range: Range<f64>,
) -> Result<ChartContext<'a, DB, Cartesian>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let slots = categories.len().max(1);
    let mut chart = ChartBuilder::on(area)
        .caption(axes.title, title_font(theme))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(-0.5..(slots as f64 - 0.5), y_range)?;

    let formatter = |x: &f64| category_label(categories, *x);
    style_mesh(&mut chart, theme, axes, slots, &formatter, true)?;
    Ok(chart)
}

/// One runtime's bars: `(x centre, height)` pairs
struct BarSeries<'s> {
    runtime: &'s str,
    width: f64,
    bars: Vec<(f64, f64)>,
}

fn draw_bar_series<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian>,
    theme: &Theme,
    series: &BarSeries,
    legend: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let color = theme.color(series.runtime);
    let half = series.width / 2.0;

    let anno = chart.draw_series(series.bars.iter().map(|&(x, height)| {
        Rectangle::new([(x - half, 0.0), (x + half, height)], color.filled())
    }))?;
    if legend {
        anno.label(theme.label(series.runtime))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    chart.draw_series(series.bars.iter().map(|&(x, height)| {
        Rectangle::new([(x - half, 0.0), (x + half, height)], theme.edge.stroke_width(1))
    }))?;
    Ok(())
}

/// Write each bar's value just above it.
fn annotate_bars<DB, F>(
    chart: &mut ChartContext<'_, DB, Cartesian>,
    theme: &Theme,
    bars: &[(f64, f64)],
    lift: f64,
    format: F,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    F: Fn(f64) -> String,
{
    let style = font(DATA_LABEL_FONT_SIZE, theme).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
        bars.iter()
            .map(|&(x, height)| Text::new(format(height), (x, height + lift), style.clone())),
    )?;
    Ok(())
}

fn draw_legend<'a, DB>(chart: &mut ChartContext<'a, DB, Cartesian>, theme: &Theme) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(theme.panel.mix(0.9))
        .border_style(theme.edge)
        .label_font(font(LEGEND_FONT_SIZE, theme))
        .draw()?;
    Ok(())
}

/// One coloured bar per runtime, labelled with its mean
fn draw_runtime_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    theme: &Theme,
    axes: &Axes,
    means: &[RuntimeMean],
    format: fn(f64) -> String,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let categories: Vec<String> = means
        .iter()
        .map(|m| theme.label(&m.runtime).to_string())
        .collect();
    let y_range = value_range(means.iter().map(|m| m.mean))?;
    let lift = means.iter().map(|m| m.mean).fold(0.0_f64, f64::max) * 0.02;

    let mut chart = category_chart(area, theme, axes, &categories, y_range)?;
    for (idx, mean) in means.iter().enumerate() {
        let series = BarSeries {
            runtime: &mean.runtime,
            width: 0.8,
            bars: vec![(idx as f64, mean.mean)],
        };
        draw_bar_series(&mut chart, theme, &series, false)?;
        annotate_bars(&mut chart, theme, &series.bars, lift, format)?;
    }
    Ok(())
}

/// Mean per runtime as a single bar series (startup latency, CPU time)
#[derive(Debug, Clone)]
pub struct RuntimeBarChart {
    pub file_stem: &'static str,
    pub title: &'static str,
    pub y_desc: &'static str,
    pub means: Vec<RuntimeMean>,
    pub value_format: fn(f64) -> String,
}

impl Chart for RuntimeBarChart {
    fn file_stem(&self) -> &'static str {
        self.file_stem
    }

    fn size(&self) -> (u32, u32) {
        SINGLE_SIZE
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&theme.background)?;
        let axes = Axes {
            title: self.title,
            y_desc: self.y_desc,
            x_desc: None,
        };
        draw_runtime_bars(root, theme, &axes, &self.means, self.value_format)
    }
}

/// Docker vs Podman memory overhead, one bar pair per container count
#[derive(Debug, Clone)]
pub struct MemoryChart {
    pub overhead: MemoryOverhead,
}

impl Chart for MemoryChart {
    fn file_stem(&self) -> &'static str {
        "memory_comparison"
    }

    fn size(&self) -> (u32, u32) {
        GROUPED_SIZE
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&theme.background)?;

        let bar_width = 0.35;
        let series: Vec<BarSeries> = CONTAINER_RUNTIMES
            .iter()
            .enumerate()
            .filter_map(|(idx, &runtime)| {
                let values = self.overhead.values(runtime)?;
                let offset = (idx as f64 - 0.5) * bar_width;
                Some(BarSeries {
                    runtime,
                    width: bar_width,
                    bars: values
                        .into_iter()
                        .enumerate()
                        .map(|(slot, v)| (slot as f64 + offset, v))
                        .collect(),
                })
            })
            .collect();

        let categories: Vec<String> = self
            .overhead
            .counts()
            .iter()
            .map(|c| format!("{} cont.", c))
            .collect();
        let heights = || series.iter().flat_map(|s| s.bars.iter().map(|&(_, h)| h));
        let lift = heights().fold(0.0_f64, f64::max) * 0.02;

        let axes = Axes {
            title: "Memory Overhead by Container Count",
            y_desc: "Overhead (MB)",
            x_desc: None,
        };
        let mut chart = category_chart(root, theme, &axes, &categories, value_range(heights())?)?;

        for s in &series {
            draw_bar_series(&mut chart, theme, s, true)?;
            let labelled: Vec<(f64, f64)> =
                s.bars.iter().copied().filter(|&(_, h)| h > 0.0).collect();
            annotate_bars(&mut chart, theme, &labelled, lift, |v| format!("{:.0}", v))?;
        }

        draw_legend(&mut chart, theme)
    }
}

/// Disk write throughput, one cluster per access mode
#[derive(Debug, Clone)]
pub struct IoChart {
    pub means: IoMeans,
}

fn io_mode_label(mode: &str) -> &str {
    match mode {
        "direct" => "Direct",
        "overlay" => "Overlay FS",
        "volume" => "Volume Mount",
        other => other,
    }
}

impl Chart for IoChart {
    fn file_stem(&self) -> &'static str {
        "io_comparison"
    }

    fn size(&self) -> (u32, u32) {
        GROUPED_SIZE
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&theme.background)?;

        let bar_width = 0.25;
        let series: Vec<BarSeries> = KNOWN_RUNTIMES
            .iter()
            .enumerate()
            .map(|(idx, &runtime)| BarSeries {
                runtime,
                width: bar_width,
                bars: IO_MODES
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, mode)| {
                        let mean = self.means.get(runtime, mode)?;
                        Some((slot as f64 + (idx as f64 - 1.0) * bar_width, mean))
                    })
                    .collect(),
            })
            .filter(|s| !s.bars.is_empty())
            .collect();

        let categories: Vec<String> = IO_MODES
            .iter()
            .map(|m| io_mode_label(m).to_string())
            .collect();
        let y_range = value_range(series.iter().flat_map(|s| s.bars.iter().map(|&(_, h)| h)))?;

        let axes = Axes {
            title: "Disk I/O: 100MB Write",
            y_desc: "Throughput (MB/s)",
            x_desc: None,
        };
        let mut chart = category_chart(root, theme, &axes, &categories, y_range)?;

        for s in &series {
            draw_bar_series(&mut chart, theme, s, true)?;
        }

        draw_legend(&mut chart, theme)
    }
}

/// Memory and start time against container count, one line per container engine
#[derive(Debug, Clone)]
pub struct ScaleChart {
    pub series: Groups<String, ScalePoint>,
}

impl ScaleChart {
    fn lines(&self) -> Vec<(&'static str, &[ScalePoint])> {
        CONTAINER_RUNTIMES
            .iter()
            .filter_map(|&runtime| self.series.get(runtime).map(|points| (runtime, points)))
            .collect()
    }
}

fn draw_line_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    theme: &Theme,
    axes: &Axes,
    lines: &[(&str, Vec<(f64, f64)>)],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points = || lines.iter().flat_map(|(_, pts)| pts.iter().copied());
    let x_max = points().map(|(x, _)| x).fold(0.0_f64, f64::max);
    let y_range = value_range(points().map(|(_, y)| y))?;

    let mut chart = ChartBuilder::on(area)
        .caption(axes.title, title_font(theme))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(0.0..(x_max * 1.1).max(1.0), y_range)?;

    let formatter = |x: &f64| format!("{:.0}", x);
    style_mesh(&mut chart, theme, axes, 10, &formatter, false)?;

    for (runtime, data) in lines {
        let color = theme.color(runtime);
        chart
            .draw_series(LineSeries::new(data.clone(), color.stroke_width(3)))?
            .label(theme.label(runtime))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));

        chart.draw_series(PointSeries::of_element(
            data.clone(),
            8,
            color.filled(),
            &|coord, size, style| EmptyElement::at(coord) + Circle::new((0, 0), size, style),
        ))?;
    }

    draw_legend(&mut chart, theme)
}

impl Chart for ScaleChart {
    fn file_stem(&self) -> &'static str {
        "scale_memory"
    }

    fn size(&self) -> (u32, u32) {
        DUAL_SIZE
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&theme.background)?;
        let panels = root.split_evenly((1, 2));
        let lines = self.lines();

        let memory: Vec<(&str, Vec<(f64, f64)>)> = lines
            .iter()
            .map(|&(rt, pts)| (rt, pts.iter().map(|p| (p.count as f64, p.memory_mb)).collect()))
            .collect();
        let time: Vec<(&str, Vec<(f64, f64)>)> = lines
            .iter()
            .map(|&(rt, pts)| (rt, pts.iter().map(|p| (p.count as f64, p.time_seconds)).collect()))
            .collect();

        let memory_axes = Axes {
            title: "Memory vs Containers",
            y_desc: "Memory Overhead (MB)",
            x_desc: Some("Number of containers"),
        };
        draw_line_panel(&panels[0], theme, &memory_axes, &memory)?;

        let time_axes = Axes {
            title: "Startup Time vs Containers",
            y_desc: "Total Time (s)",
            x_desc: Some("Number of containers"),
        };
        draw_line_panel(&panels[1], theme, &time_axes, &time)
    }
}

/// Startup and CPU means side by side
#[derive(Debug, Clone)]
pub struct SummaryChart {
    pub startup: Vec<RuntimeMean>,
    pub cpu: Vec<RuntimeMean>,
}

impl SummaryChart {
    pub fn is_empty(&self) -> bool {
        self.startup.is_empty() && self.cpu.is_empty()
    }
}

fn draw_optional_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    theme: &Theme,
    axes: &Axes,
    means: &[RuntimeMean],
    format: fn(f64) -> String,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if means.is_empty() {
        area.margin(MARGIN, MARGIN, MARGIN, MARGIN).fill(&theme.panel)?;
        return Ok(());
    }
    draw_runtime_bars(area, theme, axes, means, format)
}

impl Chart for SummaryChart {
    fn file_stem(&self) -> &'static str {
        "summary"
    }

    fn size(&self) -> (u32, u32) {
        DUAL_SIZE
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, theme: &Theme) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&theme.background)?;
        let panels = root.split_evenly((1, 2));

        let startup_axes = Axes {
            title: "Startup Latency",
            y_desc: "Time (ms)",
            x_desc: None,
        };
        draw_optional_panel(&panels[0], theme, &startup_axes, &self.startup, |v| {
            format!("{:.0}", v)
        })?;

        let cpu_axes = Axes {
            title: "CPU Benchmark",
            y_desc: "Time (s)",
            x_desc: None,
        };
        draw_optional_panel(&panels[1], theme, &cpu_axes, &self.cpu, |v| {
            format!("{:.1}", v)
        })
    }
}
