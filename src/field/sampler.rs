use std::hash::{Hash, Hasher};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{AggregationMode, EngineSettings, InterpolationMethod};
use crate::constants::IDW_MIN_DISTANCE;
use crate::emitter::Emitter;
use crate::error::{CoverageError, Result};
use crate::field::Grid;
use crate::geometry::{Bounds, Point};
use crate::propagation::PathLossModel;
use crate::propagation::path_loss::validate_frequency;

/// Grids larger than this are rejected rather than allocated.
pub const MAX_GRID_CELLS: usize = 25_000_000;

/// How emitter contributions combine at a sample point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aggregation {
    /// Maximum over emitters
    #[default]
    Strongest,
    /// Received powers summed in milliwatts
    PowerSum,
    /// Weighted mean of the dBm values
    Interpolated(InterpolationMethod),
}

/// Everything besides emitters and geometry that determines a field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldParams {
    pub model: PathLossModel,
    pub aggregation: Aggregation,
    /// Emitters farther than this from a sample point are ignored there
    pub max_distance: Option<f64>,
}

impl FieldParams {
    pub fn new(model: PathLossModel) -> Self {
        Self {
            model,
            aggregation: Aggregation::Strongest,
            max_distance: None,
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        let model = PathLossModel::from_config(&settings.propagation)?;
        let calc = &settings.calculation;
        let (aggregation, max_distance) = match calc.aggregation {
            AggregationMode::Strongest => (Aggregation::Strongest, None),
            AggregationMode::PowerSum => (Aggregation::PowerSum, None),
            AggregationMode::Interpolated => (
                Aggregation::Interpolated(calc.interpolation_method),
                Some(calc.max_interpolation_distance),
            ),
        };
        let params = Self {
            model,
            aggregation,
            max_distance,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        match self.max_distance {
            Some(d) if !d.is_finite() || d <= 0.0 => {
                return Err(CoverageError::InvalidInput(format!(
                    "max distance must be positive, got {}",
                    d
                )));
            }
            None if matches!(self.aggregation, Aggregation::Interpolated(_)) => {
                return Err(CoverageError::InvalidInput(
                    "interpolated aggregation needs a max distance".into(),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    fn out_of_range(&self, distance: f64) -> bool {
        self.max_distance.is_some_and(|max| distance > max)
    }
}

impl Hash for FieldParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model.hash(state);
        self.aggregation.hash(state);
        self.max_distance.map(f64::to_bits).hash(state);
    }
}

/// One emitter's contribution at a point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmitterSignal {
    pub emitter_id: String,
    pub signal_dbm: f64,
    pub distance: f64,
}

/// Sample the signal field over `bounds`
///
/// Each cell holds the aggregated signal of all active emitters at the cell
/// centre, or `None` when none contributes. An empty emitter set is not an
/// error and yields an all-`None` grid. The result depends only on the
/// arguments: identical inputs give bit-identical grids.
pub fn compute_field(
    emitters: &[Emitter],
    bounds: &Bounds,
    cell_size: f64,
    params: &FieldParams,
) -> Result<Grid> {
    bounds.validate()?;
    params.validate()?;
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(CoverageError::InvalidInput(format!(
            "cell size must be positive, got {}",
            cell_size
        )));
    }

    let columns = ((bounds.width / cell_size).ceil() as usize).max(1);
    let rows = ((bounds.height / cell_size).ceil() as usize).max(1);
    let cells = columns
        .checked_mul(rows)
        .filter(|&n| n <= MAX_GRID_CELLS)
        .ok_or_else(|| {
            CoverageError::InvalidInput(format!(
                "grid of {}x{} cells exceeds the limit of {} cells",
                columns, rows, MAX_GRID_CELLS
            ))
        })?;

    let active = active_emitters(emitters)?;

    let mut values = vec![None; cells];
    if !active.is_empty() {
        values
            .par_chunks_mut(columns)
            .enumerate()
            .for_each(|(row, out)| {
                let y = bounds.origin_y + (row as f64 + 0.5) * cell_size;
                for (col, cell) in out.iter_mut().enumerate() {
                    let x = bounds.origin_x + (col as f64 + 0.5) * cell_size;
                    *cell = aggregate(&active, &Point::new(x, y), params);
                }
            });
    }

    log::debug!(
        "Computed {}x{} field ({} cells) from {} active emitters",
        columns,
        rows,
        cells,
        active.len()
    );

    Ok(Grid::new(*bounds, cell_size, columns, rows, values))
}

/// Aggregated signal at a single point
pub fn signal_at(emitters: &[Emitter], point: &Point, params: &FieldParams) -> Result<Option<f64>> {
    params.validate()?;
    let active = active_emitters(emitters)?;
    Ok(aggregate(&active, point, params))
}

/// Per-emitter signals at a point, strongest first
pub fn point_signals(
    emitters: &[Emitter],
    point: &Point,
    params: &FieldParams,
) -> Result<Vec<EmitterSignal>> {
    let active = active_emitters(emitters)?;
    let mut signals: Vec<EmitterSignal> = active
        .iter()
        .map(|e| {
            let distance = point.distance_to(&e.position);
            EmitterSignal {
                emitter_id: e.id.clone(),
                signal_dbm: received_dbm(e, distance, &params.model),
                distance,
            }
        })
        .collect();
    signals.sort_by(|a, b| b.signal_dbm.total_cmp(&a.signal_dbm));
    Ok(signals)
}

fn active_emitters(emitters: &[Emitter]) -> Result<Vec<&Emitter>> {
    let mut active = Vec::with_capacity(emitters.len());
    for emitter in emitters.iter().filter(|e| e.active) {
        validate_frequency(emitter.frequency_mhz)?;
        if !emitter.position.is_finite() || !emitter.tx_power_dbm.is_finite() {
            return Err(CoverageError::InvalidInput(format!(
                "emitter {} has non-finite position or power",
                emitter.id
            )));
        }
        active.push(emitter);
    }
    Ok(active)
}

fn received_dbm(emitter: &Emitter, distance: f64, model: &PathLossModel) -> f64 {
    emitter.tx_power_dbm - model.attenuation_unchecked(distance, emitter.frequency_mhz)
}

fn aggregate(emitters: &[&Emitter], point: &Point, params: &FieldParams) -> Option<f64> {
    let in_range = emitters.iter().filter_map(|e| {
        let distance = point.distance_to(&e.position);
        (!params.out_of_range(distance)).then(|| (distance, received_dbm(e, distance, &params.model)))
    });

    match params.aggregation {
        Aggregation::Strongest => in_range.map(|(_, s)| s).reduce(f64::max),
        Aggregation::PowerSum => {
            let total_mw = in_range
                .map(|(_, s)| 10f64.powf(s / 10.0))
                .reduce(|a, b| a + b)?;
            Some(10.0 * total_mw.log10())
        }
        Aggregation::Interpolated(method) => {
            let max_distance = params.max_distance?;
            let mut weighted = 0.0;
            let mut total_weight = 0.0;
            for (distance, signal) in in_range {
                let weight = interpolation_weight(method, distance, max_distance);
                weighted += signal * weight;
                total_weight += weight;
            }
            (total_weight > 0.0).then(|| weighted / total_weight)
        }
    }
}

fn interpolation_weight(method: InterpolationMethod, distance: f64, max_distance: f64) -> f64 {
    match method {
        InterpolationMethod::Linear => (1.0 - distance / max_distance).max(0.0),
        InterpolationMethod::InverseDistance => 1.0 / distance.max(IDW_MIN_DISTANCE).powi(2),
        InterpolationMethod::Kriging => (-3.0 * distance / max_distance).exp(),
    }
}
