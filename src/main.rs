use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use signalfield::config::{EngineSettings, Frequency, ModelKind};
use signalfield::coverage::CoverageArea;
use signalfield::emitter::{Emitter, MonitorRecord, resolve_all};
use signalfield::field::{FieldCache, FieldParams, FieldRequest, point_signals};
use signalfield::geometry::{Bounds, Point};
use signalfield::output::{FieldReport, NO_COVERAGE_MESSAGE, OutputFormat, create_formatter};
use signalfield::propagation::PathLossModel;
use signalfield::render::{BlendMode, CompositeInput, CompositorKind, PixelBuffer, create_compositor, paint};
use signalfield::settings::{SettingsProvider, SettingsSource, StaticSource, TomlFileSource};

#[derive(Parser, Debug)]
#[command(name = "signalfield")]
#[command(about = "Estimate Wi-Fi signal coverage over a floor plan", long_about = None)]
struct Args {
    /// Monitor list (JSON array of monitor records)
    #[arg(short, long)]
    monitors: PathBuf,

    /// Engine settings (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Floor plan width in plan units
    #[arg(long)]
    width: f64,

    /// Floor plan height in plan units
    #[arg(long)]
    height: f64,

    #[arg(long, default_value_t = 0.0)]
    origin_x: f64,

    #[arg(long, default_value_t = 0.0)]
    origin_y: f64,

    /// Grid cell size (defaults to calculation.sampling_resolution)
    #[arg(long)]
    cell_size: Option<f64>,

    /// Path loss model override
    #[arg(long, value_enum)]
    model: Option<ModelKind>,

    /// Path loss exponent override
    #[arg(long)]
    exponent: Option<f64>,

    /// Carrier frequency for every emitter (e.g., "2437", "5.18GHz", "ch11")
    #[arg(long)]
    frequency: Option<Frequency>,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Compositor used for --ppm and --primitives
    #[arg(long, value_enum, default_value = "bands")]
    compositor: CompositorKind,

    /// Blend mode used for overlapping primitives
    #[arg(long, value_enum, default_value = "screen")]
    blend: BlendMode,

    /// Write a rendered heatmap as binary PPM
    #[arg(long)]
    ppm: Option<PathBuf>,

    /// Plan units per pixel for --ppm
    #[arg(long, default_value_t = 0.25)]
    pixel_size: f64,

    /// Write composited primitives as JSON
    #[arg(long)]
    primitives: Option<PathBuf>,

    /// Write derived coverage areas as JSON
    #[arg(long)]
    areas: Option<PathBuf>,

    /// Print per-emitter signals at a point ("x,y"); may be repeated
    #[arg(long, value_parser = parse_point)]
    probe: Vec<Point>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y: {}", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x: {}", x))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y: {}", y))?;
    Ok(Point::new(x, y))
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings> {
    let source: Box<dyn SettingsSource> = match path {
        Some(path) => Box::new(TomlFileSource::new(path)),
        None => Box::new(StaticSource::default()),
    };
    let mut provider = SettingsProvider::new(source);
    let settings = provider.current().context("Failed to load settings")?;
    Ok((*settings).clone())
}

fn load_monitors(path: &Path) -> Result<Vec<MonitorRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read monitor list {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse monitor list")
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(model) = args.model {
        settings.propagation.model = model;
    }
    if let Some(exponent) = args.exponent {
        settings.propagation.path_loss_exponent = Some(exponent);
    }
    settings.validate().context("Invalid settings")?;

    let records = load_monitors(&args.monitors)?;
    let mut emitters: Vec<Emitter> = resolve_all(&records);
    if let Some(freq) = args.frequency {
        for e in &mut emitters {
            e.frequency_mhz = freq.as_mhz();
        }
    }
    log::info!("{} of {} monitors contribute", emitters.len(), records.len());

    let bounds = Bounds::new(args.origin_x, args.origin_y, args.width, args.height)
        .context("Invalid floor plan bounds")?;
    let cell_size = args
        .cell_size
        .unwrap_or(settings.calculation.sampling_resolution);
    let params = FieldParams::from_settings(&settings)?;
    let model: PathLossModel = params.model.clone();

    let request = FieldRequest::new(emitters.clone(), bounds, cell_size, params.clone());
    let mut cache = FieldCache::new();
    let grid = cache
        .get_or_compute(&request)
        .context("Failed to compute signal field")?;

    let thresholds = &settings.thresholds;
    let mut report = FieldReport::new(&grid, &emitters, thresholds, &model);
    if matches!(args.format, OutputFormat::Csv) {
        report = report.with_cells(&grid, thresholds);
    }
    if report.has_no_coverage() {
        log::warn!("{}", NO_COVERAGE_MESSAGE);
    }

    let formatter = create_formatter(args.format, args.verbose > 0);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Some(header) = formatter.header() {
        writeln!(out, "{}", header)?;
    }
    writeln!(out, "{}", formatter.format(&report))?;

    for point in &args.probe {
        let signals = point_signals(&emitters, point, &params)?;
        writeln!(out, "Probe ({:.2}, {:.2}):", point.x, point.y)?;
        if signals.is_empty() {
            writeln!(out, "  {}", NO_COVERAGE_MESSAGE)?;
        }
        for s in signals {
            writeln!(
                out,
                "  {:<16} {:>7.1} dBm at {:.1}",
                s.emitter_id, s.signal_dbm, s.distance
            )?;
        }
    }

    if args.ppm.is_some() || args.primitives.is_some() {
        let compositor = create_compositor(args.compositor, args.blend);
        let input = CompositeInput {
            grid: Some(grid.as_ref()),
            emitters: &emitters,
            model: &model,
        };
        let primitives = compositor.composite(&input, thresholds, &settings.heatmap);
        log::info!("Composited {} primitives", primitives.len());

        if let Some(path) = &args.primitives {
            write_json(path, &primitives)?;
        }
        if let Some(path) = &args.ppm {
            let mut buffer = PixelBuffer::new(bounds, args.pixel_size)?;
            paint(&mut buffer, &primitives, compositor.blend_mode());
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            buffer.write_ppm(&mut writer)?;
            writer.flush()?;
            log::info!(
                "Wrote {}x{} heatmap to {}",
                buffer.width(),
                buffer.height(),
                path.display()
            );
        }
    }

    if let Some(path) = &args.areas {
        let areas: Vec<CoverageArea> = emitters
            .iter()
            .filter_map(|e| {
                CoverageArea::derived(format!("{}-coverage", e.id), e, thresholds, &model)
                    .map_err(|err| log::warn!("{}", err))
                    .ok()
            })
            .collect();
        write_json(path, &areas)?;
    }

    Ok(())
}
