#![allow(dead_code)]

use signalfield::config::{ModelKind, QualityThresholds};
use signalfield::emitter::{Emitter, resolve_all};
use signalfield::field::FieldParams;
use signalfield::geometry::{Bounds, Point};
use signalfield::propagation::PathLossModel;
use signalfield::simulation::{LayoutConfig, generate_layout};

pub const FREQ_MHZ: f64 = 2437.0;

pub fn emitter(id: &str, x: f64, y: f64, tx_power_dbm: f64) -> Emitter {
    Emitter::new(id, Point::new(x, y), tx_power_dbm, FREQ_MHZ)
}

/// The default indoor model with n = 3
pub fn itu_params() -> FieldParams {
    FieldParams::new(PathLossModel::new(ModelKind::ItuIndoor, 3.0).unwrap())
}

/// Plain log-distance model with n = 3 and no reference loss
pub fn log_distance_params() -> FieldParams {
    FieldParams::new(PathLossModel::new(ModelKind::LogDistance, 3.0).unwrap())
}

pub fn thresholds() -> QualityThresholds {
    QualityThresholds::default()
}

pub fn office_bounds() -> Bounds {
    Bounds::new(0.0, 0.0, 60.0, 40.0).unwrap()
}

/// Three access points spread over the office plan
pub fn office_emitters() -> Vec<Emitter> {
    vec![
        emitter("ap-lobby", 8.0, 8.0, -30.0),
        emitter("ap-open", 30.0, 20.0, -25.0),
        emitter("ap-meeting", 52.0, 34.0, -35.0),
    ]
}

/// Seeded random layout resolved to emitters
pub fn random_emitters(seed: u64, count: usize) -> Vec<Emitter> {
    let config = LayoutConfig::default()
        .with_seed(seed)
        .with_count(count)
        .with_size(60.0, 40.0);
    resolve_all(&generate_layout(&config))
}
