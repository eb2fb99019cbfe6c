use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{CoverageError, Result};
use crate::field::Grid;

/// Log-normal shadow fading
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ShadowingConfig {
    pub seed: Option<u64>,
    /// Standard deviation of the fading term in dB
    pub sigma_db: f64,
}

impl ShadowingConfig {
    pub fn new(sigma_db: f64) -> Self {
        Self {
            seed: None,
            sigma_db,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Copy of `grid` with a zero-mean Gaussian term (in dB) added to every cell
///
/// Cells without signal stay without signal.
pub fn apply_shadowing(grid: &Grid, config: &ShadowingConfig) -> Result<Grid> {
    let normal = Normal::new(0.0, config.sigma_db).map_err(|e| {
        CoverageError::InvalidInput(format!("shadowing sigma {}: {}", config.sigma_db, e))
    })?;
    let mut rng = match config.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    };

    let values = grid
        .values()
        .iter()
        .map(|v| v.map(|signal| signal + normal.sample(&mut rng)))
        .collect();
    Ok(Grid::new(
        *grid.bounds(),
        grid.cell_size(),
        grid.columns(),
        grid.rows(),
        values,
    ))
}
