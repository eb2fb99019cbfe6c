use std::hash::{Hash, Hasher};

use crate::config::{ModelKind, Obstacles, PropagationConfig};
use crate::constants::{DEFAULT_PATH_LOSS_EXPONENT, MIN_PROPAGATION_DISTANCE};
use crate::error::{CoverageError, Result};

const THIN_WALL_LOSS_DB: f64 = 3.0;
const THICK_WALL_LOSS_DB: f64 = 15.0;
const FLOOR_LOSS_DB: f64 = 20.0;
const GLASS_LOSS_DB: f64 = 2.0;
const FREE_SPACE_EXPONENT: f64 = 2.0;

/// Indoor path loss model
///
/// Every supported formula splits into a distance-independent reference
/// term and a log-distance term:
///
/// ```text
/// L(d, f) = reference(f) + 10 · n · log10(max(d, 1))
/// ```
///
/// - Log-distance: `reference = reference_loss_db` (0 unless configured)
/// - ITU indoor: `reference = 20·log10(f) − 28 + floors·Lf + wall_loss`
/// - Multi-wall: `reference = 20·log10(f) − 27.55 + obstacle losses`, `n = 2`
///
/// Keeping that split explicit lets coverage radii be solved in closed form.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLossModel {
    kind: ModelKind,
    exponent: f64,
    fixed_loss_db: f64,
}

impl PathLossModel {
    /// Build a model from validated propagation settings
    pub fn from_config(config: &PropagationConfig) -> Result<Self> {
        config.validate()?;
        let model = match config.model {
            ModelKind::LogDistance => Self {
                kind: ModelKind::LogDistance,
                exponent: config.effective_exponent(),
                fixed_loss_db: config.reference_loss_db,
            },
            ModelKind::ItuIndoor => Self {
                kind: ModelKind::ItuIndoor,
                exponent: config.effective_exponent(),
                fixed_loss_db: config.floors as f64 * config.effective_floor_loss_db()
                    + config.wall_loss_db,
            },
            ModelKind::MultiWall => Self {
                kind: ModelKind::MultiWall,
                exponent: FREE_SPACE_EXPONENT,
                fixed_loss_db: obstacle_loss_db(&config.obstacles),
            },
        };
        log::debug!(
            "Path loss model {:?}: n={:.2}, fixed loss {:.1} dB",
            model.kind,
            model.exponent,
            model.fixed_loss_db
        );
        Ok(model)
    }

    /// Plain two-term model with no extra losses
    pub fn new(kind: ModelKind, exponent: f64) -> Result<Self> {
        validate_exponent(exponent)?;
        let exponent = if kind == ModelKind::MultiWall {
            FREE_SPACE_EXPONENT
        } else {
            exponent
        };
        Ok(Self {
            kind,
            exponent,
            fixed_loss_db: 0.0,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    /// Distance-independent part of the loss at `frequency_mhz`
    pub fn reference_loss_db(&self, frequency_mhz: f64) -> f64 {
        match self.kind {
            ModelKind::LogDistance => self.fixed_loss_db,
            ModelKind::ItuIndoor => 20.0 * frequency_mhz.log10() - 28.0 + self.fixed_loss_db,
            ModelKind::MultiWall => 20.0 * frequency_mhz.log10() - 27.55 + self.fixed_loss_db,
        }
    }

    /// Attenuation in dB at `distance` plan units
    ///
    /// Rejects non-positive or non-finite frequencies. Distances below 1 are
    /// clamped to 1.
    pub fn attenuation_db(&self, distance: f64, frequency_mhz: f64) -> Result<f64> {
        validate_frequency(frequency_mhz)?;
        if distance.is_nan() {
            return Err(CoverageError::InvalidInput("distance is NaN".into()));
        }
        Ok(self.attenuation_unchecked(distance, frequency_mhz))
    }

    /// Attenuation for inputs already validated at the boundary
    pub(crate) fn attenuation_unchecked(&self, distance: f64, frequency_mhz: f64) -> f64 {
        self.reference_loss_db(frequency_mhz) + self.distance_loss_db(distance)
    }

    pub(crate) fn distance_loss_db(&self, distance: f64) -> f64 {
        10.0 * self.exponent * distance.max(MIN_PROPAGATION_DISTANCE).log10()
    }

    /// Distance at which the loss reaches `loss_db`
    ///
    /// Returns `None` when even the 1 unit reference distance loses more
    /// than `loss_db`.
    pub fn distance_for_loss(&self, loss_db: f64, frequency_mhz: f64) -> Option<f64> {
        let budget = loss_db - self.reference_loss_db(frequency_mhz);
        if budget.is_nan() || budget <= 0.0 {
            return None;
        }
        Some(10f64.powf(budget / (10.0 * self.exponent)))
    }
}

impl Hash for PathLossModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.exponent.to_bits().hash(state);
        self.fixed_loss_db.to_bits().hash(state);
    }
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            kind: ModelKind::default(),
            exponent: DEFAULT_PATH_LOSS_EXPONENT,
            fixed_loss_db: 0.0,
        }
    }
}

/// Attenuation for one of the plain two-term formulas
///
/// # Example
/// ```
/// use signalfield::config::ModelKind;
/// use signalfield::propagation::attenuation_db;
///
/// let loss = attenuation_db(ModelKind::LogDistance, 10.0, 2437.0, 3.0).unwrap();
/// assert!((loss - 30.0).abs() < 1e-9);
/// ```
pub fn attenuation_db(
    kind: ModelKind,
    distance: f64,
    frequency_mhz: f64,
    exponent: f64,
) -> Result<f64> {
    PathLossModel::new(kind, exponent)?.attenuation_db(distance, frequency_mhz)
}

pub(crate) fn validate_frequency(frequency_mhz: f64) -> Result<()> {
    if !frequency_mhz.is_finite() || frequency_mhz <= 0.0 {
        return Err(CoverageError::InvalidInput(format!(
            "frequency must be positive, got {} MHz",
            frequency_mhz
        )));
    }
    Ok(())
}

fn validate_exponent(exponent: f64) -> Result<()> {
    if !exponent.is_finite() || exponent <= 0.0 {
        return Err(CoverageError::InvalidInput(format!(
            "path loss exponent must be positive, got {}",
            exponent
        )));
    }
    Ok(())
}

fn obstacle_loss_db(obstacles: &Obstacles) -> f64 {
    obstacles.thin_walls as f64 * THIN_WALL_LOSS_DB
        + obstacles.thick_walls as f64 * THICK_WALL_LOSS_DB
        + obstacles.floors as f64 * FLOOR_LOSS_DB
        + obstacles.glass as f64 * GLASS_LOSS_DB
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_log_distance() {
        let model = PathLossModel::new(ModelKind::LogDistance, 3.0).unwrap();
        assert!((model.attenuation_db(1.0, 2437.0).unwrap() - 0.0).abs() < 1e-12);
        assert!((model.attenuation_db(10.0, 2437.0).unwrap() - 30.0).abs() < 1e-12);
        assert!((model.attenuation_db(100.0, 2437.0).unwrap() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_itu_indoor() {
        let model = PathLossModel::new(ModelKind::ItuIndoor, 3.0).unwrap();
        let l0 = 20.0 * 2437f64.log10() - 28.0;
        assert!((l0 - 39.737).abs() < 0.01);
        assert!((model.attenuation_db(1.0, 2437.0).unwrap() - l0).abs() < 1e-12);
        assert!((model.attenuation_db(10.0, 2437.0).unwrap() - (l0 + 30.0)).abs() < 1e-12);
    }

    #[test]
    fn test_multi_wall_uses_free_space_exponent() {
        let config = PropagationConfig {
            model: ModelKind::MultiWall,
            obstacles: Obstacles {
                thin_walls: 2,
                thick_walls: 1,
                floors: 0,
                glass: 1,
            },
            ..Default::default()
        };
        let model = PathLossModel::from_config(&config).unwrap();
        assert_eq!(model.exponent(), 2.0);
        let expected = 20.0 * 10f64.log10() + 20.0 * 2437f64.log10() - 27.55 + 6.0 + 15.0 + 2.0;
        assert!((model.attenuation_db(10.0, 2437.0).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_floor_and_wall_losses() {
        let config = PropagationConfig {
            environment: Environment::Residential,
            floors: 2,
            wall_loss_db: 4.0,
            ..Default::default()
        };
        let model = PathLossModel::from_config(&config).unwrap();
        let plain = PathLossModel::new(ModelKind::ItuIndoor, 2.8).unwrap();
        let diff = model.attenuation_db(20.0, 2437.0).unwrap()
            - plain.attenuation_db(20.0, 2437.0).unwrap();
        assert!((diff - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_below_one_unit() {
        for kind in [ModelKind::LogDistance, ModelKind::ItuIndoor, ModelKind::MultiWall] {
            let model = PathLossModel::new(kind, 3.0).unwrap();
            let at_one = model.attenuation_db(1.0, 5180.0).unwrap();
            for d in [0.0, 1e-9, 0.25, 0.999, -3.0] {
                assert_eq!(model.attenuation_db(d, 5180.0).unwrap(), at_one);
            }
        }
    }

    #[test]
    fn test_rejects_invalid_frequency() {
        let model = PathLossModel::default();
        assert!(model.attenuation_db(5.0, 0.0).is_err());
        assert!(model.attenuation_db(5.0, -2400.0).is_err());
        assert!(model.attenuation_db(5.0, f64::NAN).is_err());
        assert!(attenuation_db(ModelKind::LogDistance, 5.0, 2437.0, 0.0).is_err());
    }

    #[test]
    fn test_distance_for_loss_inverts_attenuation() {
        let model = PathLossModel::new(ModelKind::ItuIndoor, 3.0).unwrap();
        let d = model.distance_for_loss(80.0, 2437.0).unwrap();
        assert!((model.attenuation_db(d, 2437.0).unwrap() - 80.0).abs() < 1e-9);
        assert!(model.distance_for_loss(30.0, 2437.0).is_none());
    }
}
