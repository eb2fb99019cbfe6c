//! Configuration for the signal coverage engine.
//!
//! Settings are grouped the way the settings service stores them: quality
//! thresholds, heatmap presentation, field calculation, propagation and
//! coverage-area validation. Every section has defaults, so a settings file
//! only needs to name what it changes:
//!
//! ```toml
//! [thresholds]
//! excellent = -45.0
//! good = -55.0
//! fair = -67.0
//! poor = -78.0
//!
//! [propagation]
//! model = "log-distance"
//! path_loss_exponent = 2.8
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FREQUENCY_MHZ, USABILITY_MARGIN_DB};
use crate::error::{CoverageError, Result};
use crate::render::color::ColorRamp;

/// Radio frequency specification
///
/// Accepts a bare number of MHz, an explicit unit, or a 2.4 GHz channel number.
///
/// # Parsing formats
/// - `2437` - frequency in MHz (no suffix)
/// - `2437mhz` or `2437MHz` - frequency in MHz (explicit)
/// - `5.18ghz` or `5.18GHz` - frequency in GHz
/// - `ch6` - 2.4 GHz channel number (1-14)
///
/// # Example
/// ```
/// use signalfield::config::Frequency;
///
/// let freq: Frequency = "ch6".parse().unwrap();
/// assert!((freq.as_mhz() - 2437.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency(f64);

impl Frequency {
    /// Create from frequency in MHz
    pub fn from_mhz(mhz: f64) -> Self {
        Self(mhz)
    }

    /// Create from a 2.4 GHz band channel number
    pub fn from_channel(channel: u8) -> Option<Self> {
        match channel {
            1..=13 => Some(Self(2407.0 + 5.0 * channel as f64)),
            14 => Some(Self(2484.0)),
            _ => None,
        }
    }

    /// Get frequency in MHz
    pub fn as_mhz(&self) -> f64 {
        self.0
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self(DEFAULT_FREQUENCY_MHZ)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}MHz", self.0)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        if let Some(num) = lower.strip_prefix("ch") {
            let channel: u8 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid channel: {}", s))?;
            return Self::from_channel(channel)
                .ok_or_else(|| format!("channel out of range: {}", s));
        }

        let (num, scale) = if let Some(num) = lower.strip_suffix("ghz") {
            (num, 1000.0)
        } else if let Some(num) = lower.strip_suffix("mhz") {
            (num, 1.0)
        } else {
            (lower.as_str(), 1.0)
        };

        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid frequency: {}", s))?;
        let mhz = value * scale;
        if !mhz.is_finite() || mhz <= 0.0 {
            return Err("frequency must be positive".to_string());
        }
        Ok(Self::from_mhz(mhz))
    }
}

/// Propagation formula
///
/// The two distance formulas found in the field disagree about the
/// distance-independent term, so the choice is always explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// `10·n·log10(d)`, optionally offset by a fixed reference loss
    LogDistance,
    /// ITU-R P.1238 style: `20·log10(f) − 28 + 10·n·log10(d)` plus floor/wall losses
    #[default]
    ItuIndoor,
    /// Free-space loss plus per-obstacle attenuation
    MultiWall,
}

/// Building type presets for the indoor model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    #[default]
    Office,
    Residential,
    Commercial,
    Industrial,
}

impl Environment {
    /// Path loss exponent typical for this environment
    pub fn path_loss_exponent(&self) -> f64 {
        match self {
            Self::Office => 3.0,
            Self::Residential => 2.8,
            Self::Commercial => 2.2,
            Self::Industrial => 2.1,
        }
    }

    /// Attenuation per floor crossed, in dB
    pub fn floor_loss_db(&self) -> f64 {
        match self {
            Self::Office => 15.0,
            Self::Residential => 10.0,
            Self::Commercial => 12.0,
            Self::Industrial => 8.0,
        }
    }
}

/// Obstacle counts for the multi-wall model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Obstacles {
    /// Drywall or wood partitions (3 dB each)
    pub thin_walls: u32,
    /// Concrete or brick walls (15 dB each)
    pub thick_walls: u32,
    /// Floors or ceilings (20 dB each)
    pub floors: u32,
    /// Glass windows or doors (2 dB each)
    pub glass: u32,
}

/// Propagation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Formula used for every emitter
    pub model: ModelKind,
    /// Explicit path loss exponent; falls back to the environment preset
    pub path_loss_exponent: Option<f64>,
    /// Building type used for preset exponent and floor loss
    pub environment: Environment,
    /// Floors between emitter and receiver (indoor model)
    pub floors: u32,
    /// Explicit per-floor loss in dB; falls back to the environment preset
    pub floor_loss_db: Option<f64>,
    /// Additional fixed loss for walls and furniture in dB (indoor model)
    pub wall_loss_db: f64,
    /// Loss at the 1 unit reference distance (log-distance model)
    pub reference_loss_db: f64,
    /// Obstacles between emitter and receiver (multi-wall model)
    pub obstacles: Obstacles,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::ItuIndoor,
            path_loss_exponent: None,
            environment: Environment::Office,
            floors: 0,
            floor_loss_db: None,
            wall_loss_db: 0.0,
            reference_loss_db: 0.0,
            obstacles: Obstacles::default(),
        }
    }
}

impl PropagationConfig {
    /// Exponent actually used by the distance term
    pub fn effective_exponent(&self) -> f64 {
        self.path_loss_exponent
            .unwrap_or_else(|| self.environment.path_loss_exponent())
    }

    pub fn effective_floor_loss_db(&self) -> f64 {
        self.floor_loss_db
            .unwrap_or_else(|| self.environment.floor_loss_db())
    }

    pub fn validate(&self) -> Result<()> {
        let exponent = self.effective_exponent();
        if !exponent.is_finite() || exponent <= 0.0 {
            return Err(CoverageError::Config(format!(
                "path loss exponent must be positive, got {}",
                exponent
            )));
        }
        for (name, value) in [
            ("floor_loss_db", self.effective_floor_loss_db()),
            ("wall_loss_db", self.wall_loss_db),
            ("reference_loss_db", self.reference_loss_db),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoverageError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Signal strength cutoffs for the quality bands
///
/// Values are in dBm and strictly decreasing from `excellent` to `poor`.
/// Anything below `poor` is weak. Construction rejects misordered values;
/// use [`QualityThresholds::sorted`] to opt into reordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdValues", into = "ThresholdValues")]
pub struct QualityThresholds {
    excellent: f64,
    good: f64,
    fair: f64,
    poor: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ThresholdValues {
    excellent: f64,
    good: f64,
    fair: f64,
    poor: f64,
}

impl TryFrom<ThresholdValues> for QualityThresholds {
    type Error = CoverageError;

    fn try_from(v: ThresholdValues) -> Result<Self> {
        Self::new(v.excellent, v.good, v.fair, v.poor)
    }
}

impl From<QualityThresholds> for ThresholdValues {
    fn from(t: QualityThresholds) -> Self {
        Self {
            excellent: t.excellent,
            good: t.good,
            fair: t.fair,
            poor: t.poor,
        }
    }
}

impl QualityThresholds {
    pub fn new(excellent: f64, good: f64, fair: f64, poor: f64) -> Result<Self> {
        let all_finite = [excellent, good, fair, poor].iter().all(|v| v.is_finite());
        if !all_finite || !(excellent > good && good > fair && fair > poor) {
            return Err(CoverageError::InvalidThresholds {
                excellent,
                good,
                fair,
                poor,
            });
        }
        Ok(Self {
            excellent,
            good,
            fair,
            poor,
        })
    }

    /// Build thresholds from values in any order
    ///
    /// Reordering is logged. Duplicate or non-finite values are still rejected.
    pub fn sorted(values: [f64; 4]) -> Result<Self> {
        let mut sorted = values;
        sorted.sort_by(|a, b| b.total_cmp(a));
        if sorted != values {
            log::warn!(
                "Reordering quality thresholds {:?} -> {:?}",
                values,
                sorted
            );
        }
        Self::new(sorted[0], sorted[1], sorted[2], sorted[3])
    }

    pub fn excellent(&self) -> f64 {
        self.excellent
    }

    pub fn good(&self) -> f64 {
        self.good
    }

    pub fn fair(&self) -> f64 {
        self.fair
    }

    pub fn poor(&self) -> f64 {
        self.poor
    }

    /// Cutoffs from strongest to weakest
    pub fn cutoffs(&self) -> [f64; 4] {
        [self.excellent, self.good, self.fair, self.poor]
    }

    /// Signal level below which coverage is considered unusable
    pub fn usability_floor(&self) -> f64 {
        self.poor - USABILITY_MARGIN_DB
    }
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: -50.0,
            good: -60.0,
            fair: -70.0,
            poor: -80.0,
        }
    }
}

/// Heatmap presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    /// Draw the heatmap at all
    pub enabled: bool,
    /// Opacity multiplier (0-1)
    pub intensity: f64,
    /// Minimum gradient radius per emitter in plan units (5-100)
    pub radius: f64,
    /// Edge feathering in plan units (0-50)
    pub blur: f64,
    /// Colour ramp for continuous rendering
    pub gradient: ColorRamp,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.8,
            radius: 25.0,
            blur: 15.0,
            gradient: ColorRamp::default(),
        }
    }
}

impl HeatmapSettings {
    pub fn validate(&self) -> Result<()> {
        check_range("heatmap.intensity", self.intensity, 0.0, 1.0)?;
        check_range("heatmap.radius", self.radius, 5.0, 100.0)?;
        check_range("heatmap.blur", self.blur, 0.0, 50.0)?;
        Ok(())
    }
}

/// How several emitter contributions combine into one cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    /// Strongest emitter wins (clients roam to the best access point)
    #[default]
    Strongest,
    /// Sum of received powers in the linear domain
    PowerSum,
    /// Weighted average using the configured interpolation method
    Interpolated,
}

/// Weighting scheme for interpolated aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMethod {
    Linear,
    #[default]
    InverseDistance,
    Kriging,
}

/// Field calculation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationSettings {
    pub aggregation: AggregationMode,
    pub interpolation_method: InterpolationMethod,
    /// Grid cell size in plan units
    pub sampling_resolution: f64,
    /// Emitters farther than this do not contribute to interpolated cells
    pub max_interpolation_distance: f64,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            aggregation: AggregationMode::Strongest,
            interpolation_method: InterpolationMethod::InverseDistance,
            sampling_resolution: 1.0,
            max_interpolation_distance: 50.0,
        }
    }
}

impl CalculationSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.sampling_resolution.is_finite() || self.sampling_resolution <= 0.0 {
            return Err(CoverageError::Config(format!(
                "sampling_resolution must be positive, got {}",
                self.sampling_resolution
            )));
        }
        if !self.max_interpolation_distance.is_finite() || self.max_interpolation_distance <= 0.0
        {
            return Err(CoverageError::Config(format!(
                "max_interpolation_distance must be positive, got {}",
                self.max_interpolation_distance
            )));
        }
        Ok(())
    }
}

/// Limits applied to authored coverage areas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Largest accepted coverage area in square plan units
    pub max_area_size: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_area_size: 10_000.0,
        }
    }
}

/// Complete engine configuration
///
/// # Example
/// ```
/// use signalfield::config::EngineSettings;
///
/// let settings = EngineSettings::from_toml_str("[heatmap]\nintensity = 0.5\n").unwrap();
/// assert_eq!(settings.heatmap.intensity, 0.5);
/// assert_eq!(settings.thresholds.poor(), -80.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub thresholds: QualityThresholds,
    pub heatmap: HeatmapSettings,
    pub calculation: CalculationSettings,
    pub propagation: PropagationConfig,
    pub validation: ValidationRules,
}

impl EngineSettings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject any configuration the engine cannot use
    pub fn validate(&self) -> Result<()> {
        // Thresholds are validated on construction.
        self.heatmap.validate()?;
        self.calculation.validate()?;
        self.propagation.validate()?;
        if !self.validation.max_area_size.is_finite() || self.validation.max_area_size <= 0.0 {
            return Err(CoverageError::Config(format!(
                "max_area_size must be positive, got {}",
                self.validation.max_area_size
            )));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(CoverageError::Config(format!(
            "{} must be within {}..={}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}
