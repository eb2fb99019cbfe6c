use crate::config::QualityThresholds;
use crate::emitter::Emitter;
use crate::propagation::PathLossModel;

/// Distance at which an emitter's signal falls to the usability floor
///
/// The floor is `poor − 10` dBm. The path loss model is inverted in closed
/// form; for the log-distance model this is
/// `10^((tx − floor) / (10·n))`. An emitter already below the floor at the
/// reference distance gets a radius of 0.
pub fn derive_coverage_radius(
    emitter: &Emitter,
    thresholds: &QualityThresholds,
    model: &PathLossModel,
) -> f64 {
    distance_for_signal(emitter, thresholds.usability_floor(), model).unwrap_or(0.0)
}

/// Distance at which an emitter's signal falls to `target_dbm`
///
/// `None` when the signal is at or below the target even at the reference
/// distance.
pub fn distance_for_signal(emitter: &Emitter, target_dbm: f64, model: &PathLossModel) -> Option<f64> {
    model.distance_for_loss(emitter.tx_power_dbm - target_dbm, emitter.frequency_mhz)
}

/// Distances to each band boundary, strongest first
///
/// Entry `i` is where the signal drops below `thresholds.cutoffs()[i]`;
/// boundaries the emitter never reaches are 0.
pub fn band_radii(emitter: &Emitter, thresholds: &QualityThresholds, model: &PathLossModel) -> [f64; 4] {
    thresholds
        .cutoffs()
        .map(|cutoff| distance_for_signal(emitter, cutoff, model).unwrap_or(0.0))
}
