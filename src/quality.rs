use std::fmt;

use serde::Serialize;

use crate::config::QualityThresholds;
use crate::field::Grid;

/// Signal quality band, strongest first
///
/// The derived ordering follows declaration order, so `Excellent < Weak`
/// in `Ord` terms; use [`Band::rank`] when a "higher is better" number is
/// more convenient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Band {
    Excellent,
    Good,
    Fair,
    Poor,
    Weak,
    NoSignal,
}

impl Band {
    pub const ALL: [Band; 6] = [
        Band::Excellent,
        Band::Good,
        Band::Fair,
        Band::Poor,
        Band::Weak,
        Band::NoSignal,
    ];

    /// 5 for excellent down to 0 for no signal
    pub fn rank(&self) -> u8 {
        match self {
            Band::Excellent => 5,
            Band::Good => 4,
            Band::Fair => 3,
            Band::Poor => 2,
            Band::Weak => 1,
            Band::NoSignal => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Excellent => "excellent",
            Band::Good => "good",
            Band::Fair => "fair",
            Band::Poor => "poor",
            Band::Weak => "weak",
            Band::NoSignal => "no signal",
        }
    }

    fn index(&self) -> usize {
        (5 - self.rank()) as usize
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a sampled value
///
/// `None` (and NaN) mean "no data" and map to [`Band::NoSignal`]. Every real
/// value, however low, lands in a real band.
pub fn classify(signal_dbm: Option<f64>, thresholds: &QualityThresholds) -> Band {
    let Some(signal) = signal_dbm.filter(|s| !s.is_nan()) else {
        return Band::NoSignal;
    };

    if signal >= thresholds.excellent() {
        Band::Excellent
    } else if signal >= thresholds.good() {
        Band::Good
    } else if signal >= thresholds.fair() {
        Band::Fair
    } else if signal >= thresholds.poor() {
        Band::Poor
    } else {
        Band::Weak
    }
}

/// Cell counts per band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandHistogram {
    counts: [usize; 6],
}

impl BandHistogram {
    pub fn from_grid(grid: &Grid, thresholds: &QualityThresholds) -> Self {
        let mut histogram = Self::default();
        for value in grid.values() {
            histogram.add(classify(*value, thresholds));
        }
        histogram
    }

    pub fn add(&mut self, band: Band) {
        self.counts[band.index()] += 1;
    }

    pub fn count(&self, band: Band) -> usize {
        self.counts[band.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Fraction of cells classified at `band` or better
    pub fn fraction_at_least(&self, band: Band) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let covered: usize = Band::ALL
            .iter()
            .filter(|b| b.rank() >= band.rank())
            .map(|b| self.count(*b))
            .sum();
        covered as f64 / total as f64
    }
}
