pub mod snapshot;

use serde::{Deserialize, Serialize};
use url::Url;

pub use snapshot::{
    ClimateLog, ClimateState, DeviceLog, DeviceState, LoggedSnapshot, SensorLog, SensorState,
    Snapshot,
};

// We use `Box<str>` for names that are fixed once the station boots.
type BoxStr = Box<str>;

/// Endpoint suffixes exposed by every peripheral service.
pub mod endpoint {
    /// Current state of the peripheral.
    pub const INFO: &str = "/info";
    /// Toggles the `enabled` flag.
    pub const ENABLED: &str = "/enabled";
    /// Toggles the `detected` flag. Sensors only.
    pub const DETECTED: &str = "/detected";
    /// Applies desired settings. Climate units only.
    pub const UPDATE: &str = "/update";
}

/// The category a peripheral belongs to. Decides which state shape it
/// reports and which endpoints it serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeripheralKind {
    /// Presence, gas and door sensors.
    Sensor,
    /// Switchable devices with a single `enabled` flag.
    Device,
    /// Air-conditioning unit with temperature and humidity setpoints.
    Climate,
}

impl PeripheralKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeripheralKind::Sensor => "sensor",
            PeripheralKind::Device => "device",
            PeripheralKind::Climate => "climate",
        }
    }
}

impl std::fmt::Display for PeripheralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one peripheral instance: the name it is logged under and the
/// base address of its HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralRef {
    name: BoxStr,
    address: Url,
}

impl PeripheralRef {
    pub fn new(name: impl Into<BoxStr>, address: Url) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    /// Full address of `suffix` on this peripheral.
    ///
    /// The suffix is appended verbatim; only a trailing `/` on the base
    /// address is dropped so that `http://host:8081` (which `Url` renders as
    /// `http://host:8081/`) and `http://host/gasSensor` both join cleanly.
    pub fn endpoint(&self, suffix: &str) -> String {
        let base = self.address.as_str().trim_end_matches('/');
        format!("{base}{suffix}")
    }
}

impl std::fmt::Display for PeripheralRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}
