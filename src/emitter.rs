//! Monitor records and the emitters derived from them.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FREQUENCY_MHZ, DEFAULT_TX_POWER_DBM, RSSI_TO_TX_POWER_OFFSET_DB};
use crate::geometry::Point;

/// Lifecycle state reported by the monitor registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Active,
    #[default]
    Inactive,
    Offline,
    #[serde(other)]
    Unknown,
}

/// Live Wi-Fi link information
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WifiConnection {
    /// Received signal strength of the uplink in dBm
    pub rssi: Option<f64>,
    /// Channel centre frequency in MHz
    pub frequency: Option<f64>,
}

/// A monitor as delivered by the registry service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<Point>,
    #[serde(default)]
    pub status: MonitorStatus,
    #[serde(default)]
    pub wifi_connection: Option<WifiConnection>,
}

/// A positioned access point contributing to the signal field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emitter {
    pub id: String,
    pub position: Point,
    /// Effective transmit power in dBm
    pub tx_power_dbm: f64,
    /// Carrier frequency in MHz, always positive
    pub frequency_mhz: f64,
    pub active: bool,
}

impl Emitter {
    pub fn new(id: impl Into<String>, position: Point, tx_power_dbm: f64, frequency_mhz: f64) -> Self {
        Self {
            id: id.into(),
            position,
            tx_power_dbm,
            frequency_mhz,
            active: true,
        }
    }

    /// Whether this emitter may contribute to a field
    pub fn contributes(&self) -> bool {
        self.active
            && self.position.is_finite()
            && self.tx_power_dbm.is_finite()
            && self.frequency_mhz.is_finite()
            && self.frequency_mhz > 0.0
    }
}

/// Turn a monitor record into an emitter
///
/// Returns `None` for monitors that must not contribute: unplaced (no
/// position, or the `(0, 0)` placeholder), not active, or reporting an
/// unusable frequency.
pub fn resolve(record: &MonitorRecord) -> Option<Emitter> {
    let position = record.position?;

    if position.x == 0.0 && position.y == 0.0 {
        log::debug!("Monitor {} is unplaced", record.id);
        return None;
    }
    if !position.is_finite() {
        log::warn!("Monitor {} has a non-finite position, skipping", record.id);
        return None;
    }
    if record.status != MonitorStatus::Active {
        log::debug!("Monitor {} is {:?}", record.id, record.status);
        return None;
    }

    let link = record.wifi_connection.unwrap_or_default();

    let frequency_mhz = match link.frequency {
        Some(f) if f.is_finite() && f > 0.0 => f,
        Some(f) => {
            log::warn!("Monitor {} reports invalid frequency {} MHz, skipping", record.id, f);
            return None;
        }
        None => DEFAULT_FREQUENCY_MHZ,
    };

    let tx_power_dbm = match link.rssi {
        Some(rssi) if rssi.is_finite() => rssi + RSSI_TO_TX_POWER_OFFSET_DB,
        _ => DEFAULT_TX_POWER_DBM,
    };

    Some(Emitter {
        id: record.id.clone(),
        position,
        tx_power_dbm,
        frequency_mhz,
        active: true,
    })
}

/// Resolve every record, keeping input order and dropping excluded monitors
pub fn resolve_all(records: &[MonitorRecord]) -> Vec<Emitter> {
    let emitters: Vec<Emitter> = records.iter().filter_map(resolve).collect();
    log::debug!("Resolved {} of {} monitors", emitters.len(), records.len());
    emitters
}
