use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::emitter::{MonitorRecord, MonitorStatus, WifiConnection};
use crate::geometry::Point;

/// Parameters of a random monitor layout
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub seed: Option<u64>,
    pub count: usize,
    pub width: f64,
    pub height: f64,
    /// Distance kept from the plan edges
    pub margin: f64,
    /// Uplink RSSI range in dBm
    pub rssi_min: f64,
    pub rssi_max: f64,
    /// Probability that a monitor has no live RSSI
    pub missing_rssi: f64,
    /// Probability that a monitor is not active
    pub inactive: f64,
    /// Probability that a monitor has no position yet
    pub unplaced: f64,
    /// Candidate channel frequencies in MHz
    pub channels: Vec<f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: None,
            count: 8,
            width: 100.0,
            height: 60.0,
            margin: 2.0,
            rssi_min: -75.0,
            rssi_max: -40.0,
            missing_rssi: 0.0,
            inactive: 0.0,
            unplaced: 0.0,
            channels: vec![2412.0, 2437.0, 2462.0, 5180.0],
        }
    }
}

impl LayoutConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Fractions of inactive, unplaced and RSSI-less monitors
    pub fn with_dropouts(mut self, inactive: f64, unplaced: f64, missing_rssi: f64) -> Self {
        self.inactive = inactive;
        self.unplaced = unplaced;
        self.missing_rssi = missing_rssi;
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn uniform(rng: &mut ChaCha8Rng, lo: f64, hi: f64) -> f64 {
    lo + rng.random::<f64>() * (hi - lo)
}

/// Random monitor records inside `width × height`
///
/// Positions stay clear of the `(0, 0)` placeholder. The same seed always
/// yields the same layout.
pub fn generate_layout(config: &LayoutConfig) -> Vec<MonitorRecord> {
    let mut rng = create_rng(config.seed);
    let margin = config.margin.clamp(0.0, config.width.min(config.height) / 2.0);

    (0..config.count)
        .map(|i| {
            let x = uniform(&mut rng, margin, config.width - margin);
            let y = uniform(&mut rng, margin, config.height - margin);
            let rssi = uniform(&mut rng, config.rssi_min, config.rssi_max);
            let channel = if config.channels.is_empty() {
                None
            } else {
                let idx = (rng.random::<f64>() * config.channels.len() as f64) as usize;
                config.channels.get(idx.min(config.channels.len() - 1)).copied()
            };

            let placed = rng.random::<f64>() >= config.unplaced;
            let active = rng.random::<f64>() >= config.inactive;
            let has_rssi = rng.random::<f64>() >= config.missing_rssi;

            MonitorRecord {
                id: format!("monitor-{:03}", i + 1),
                name: Some(format!("Monitor {}", i + 1)),
                position: placed.then(|| Point::new(x.max(f64::EPSILON), y.max(f64::EPSILON))),
                status: if active {
                    MonitorStatus::Active
                } else {
                    MonitorStatus::Offline
                },
                wifi_connection: Some(WifiConnection {
                    rssi: has_rssi.then_some(rssi),
                    frequency: channel,
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::resolve_all;

    #[test]
    fn test_seeded_layout_is_reproducible() {
        let config = LayoutConfig::default().with_seed(7).with_count(20);
        assert_eq!(generate_layout(&config), generate_layout(&config));
        let other = LayoutConfig::default().with_seed(8).with_count(20);
        assert_ne!(generate_layout(&config), generate_layout(&other));
    }

    #[test]
    fn test_positions_respect_margin() {
        let config = LayoutConfig::default().with_seed(1).with_count(50).with_size(30.0, 20.0);
        for record in generate_layout(&config) {
            let p = record.position.unwrap();
            assert!(p.x >= 2.0 && p.x <= 28.0);
            assert!(p.y >= 2.0 && p.y <= 18.0);
        }
    }

    #[test]
    fn test_dropouts_are_excluded_on_resolve() {
        let config = LayoutConfig::default()
            .with_seed(3)
            .with_count(40)
            .with_dropouts(0.5, 0.0, 0.0);
        let records = generate_layout(&config);
        let emitters = resolve_all(&records);
        let active = records
            .iter()
            .filter(|r| r.status == MonitorStatus::Active)
            .count();
        assert_eq!(emitters.len(), active);
        assert!(active < records.len());
    }
}
