mod csv;
mod json;
mod text;

use chrono::Utc;
use rolling_stats::Stats;
use serde::Serialize;

use crate::config::{ModelKind, QualityThresholds};
use crate::coverage::derive_coverage_radius;
use crate::emitter::Emitter;
use crate::field::Grid;
use crate::geometry::Bounds;
use crate::propagation::PathLossModel;
use crate::quality::{Band, BandHistogram, classify};

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

pub const NO_COVERAGE_MESSAGE: &str = "no coverage data available";

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BandCount {
    pub band: Band,
    pub cells: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmitterCoverage {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub tx_power_dbm: f64,
    pub frequency_mhz: f64,
    /// Distance to the usability floor; 0 when the emitter never reaches it
    pub coverage_radius: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellRecord {
    pub col: usize,
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub signal_dbm: Option<f64>,
    pub band: Band,
}

/// Summary of one computed field
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub generated_at: String,
    pub bounds: Bounds,
    pub cell_size: f64,
    pub columns: usize,
    pub rows: usize,
    pub model: ModelKind,
    pub path_loss_exponent: f64,
    pub bands: Vec<BandCount>,
    pub signal: Option<StatsSummary>,
    /// Fraction of cells at `Poor` or better
    pub usable_fraction: f64,
    pub emitters: Vec<EmitterCoverage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<CellRecord>,
}

impl FieldReport {
    pub fn new(
        grid: &Grid,
        emitters: &[Emitter],
        thresholds: &QualityThresholds,
        model: &PathLossModel,
    ) -> Self {
        let histogram = BandHistogram::from_grid(grid, thresholds);
        let mut stats: Stats<f64> = Stats::new();
        for value in grid.values().iter().flatten() {
            if value.is_finite() {
                stats.update(*value);
            }
        }

        let emitters = emitters
            .iter()
            .filter(|e| e.contributes())
            .map(|e| EmitterCoverage {
                id: e.id.clone(),
                x: e.position.x,
                y: e.position.y,
                tx_power_dbm: e.tx_power_dbm,
                frequency_mhz: e.frequency_mhz,
                coverage_radius: derive_coverage_radius(e, thresholds, model),
            })
            .collect();

        Self {
            generated_at: iso8601_timestamp(),
            bounds: *grid.bounds(),
            cell_size: grid.cell_size(),
            columns: grid.columns(),
            rows: grid.rows(),
            model: model.kind(),
            path_loss_exponent: model.exponent(),
            bands: Band::ALL
                .iter()
                .map(|&band| BandCount {
                    band,
                    cells: histogram.count(band),
                })
                .collect(),
            signal: StatsSummary::from_stats(&stats),
            usable_fraction: histogram.fraction_at_least(Band::Poor),
            emitters,
            cells: Vec::new(),
        }
    }

    /// Attach one record per grid cell
    pub fn with_cells(mut self, grid: &Grid, thresholds: &QualityThresholds) -> Self {
        self.cells = grid
            .iter()
            .map(|(col, row, value)| {
                let center = grid.cell_center(col, row);
                CellRecord {
                    col,
                    row,
                    x: center.x,
                    y: center.y,
                    signal_dbm: value,
                    band: classify(value, thresholds),
                }
            })
            .collect();
        self
    }

    /// True when no cell carries a signal value
    pub fn has_no_coverage(&self) -> bool {
        self.signal.is_none()
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &FieldReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter::new(verbose)),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::field::{FieldParams, compute_field};
    use crate::geometry::Point;

    pub(crate) fn sample_report(emitters: &[Emitter]) -> (FieldReport, Grid) {
        let model = PathLossModel::new(ModelKind::LogDistance, 3.0).unwrap();
        let bounds = Bounds::from_size(40.0, 20.0).unwrap();
        let grid = compute_field(emitters, &bounds, 10.0, &FieldParams::new(model.clone())).unwrap();
        let thresholds = QualityThresholds::default();
        let report = FieldReport::new(&grid, emitters, &thresholds, &model).with_cells(&grid, &thresholds);
        (report, grid)
    }

    #[test]
    fn test_report_counts_every_cell() {
        let emitters = vec![Emitter::new("a", Point::new(5.0, 5.0), -30.0, 2437.0)];
        let (report, grid) = sample_report(&emitters);
        let total: usize = report.bands.iter().map(|b| b.cells).sum();
        assert_eq!(total, grid.len());
        assert_eq!(report.cells.len(), grid.len());
        assert_eq!(report.emitters.len(), 1);
        assert!((report.emitters[0].coverage_radius - 100.0).abs() < 1e-9);
        let stats = report.signal.as_ref().unwrap();
        assert_eq!(stats.count, 8);
        assert!(stats.max <= -30.0);
        assert_eq!(report.usable_fraction, 1.0);
    }

    #[test]
    fn test_empty_field_has_no_coverage() {
        let (report, _) = sample_report(&[]);
        assert!(report.has_no_coverage());
        assert!(report.emitters.is_empty());
        assert_eq!(report.usable_fraction, 0.0);
    }
}
