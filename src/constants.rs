//! Numeric constants shared across the coverage engine
//!
//! Defaults for emitter resolution and the margins used when turning
//! thresholds into coverage geometry.

/// Transmit power assumed when a monitor has no live RSSI reading (dBm).
pub const DEFAULT_TX_POWER_DBM: f64 = -30.0;

/// Frequency assumed when a monitor does not report one (channel 6, 2.4 GHz).
pub const DEFAULT_FREQUENCY_MHZ: f64 = 2437.0;

/// Offset added to a live RSSI reading to estimate transmit power (dB).
pub const RSSI_TO_TX_POWER_OFFSET_DB: f64 = 30.0;

/// Default path loss exponent (typical office).
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 3.0;

/// Distances below this are clamped before taking a logarithm.
pub const MIN_PROPAGATION_DISTANCE: f64 = 1.0;

/// Margin below the "poor" threshold at which a signal is no longer usable (dB).
pub const USABILITY_MARGIN_DB: f64 = 10.0;

/// Minimum distance used by inverse distance weighting.
pub const IDW_MIN_DISTANCE: f64 = 0.1;

/// Two polygon vertices closer than this are considered identical.
pub const GEOMETRY_EPSILON: f64 = 1e-9;
