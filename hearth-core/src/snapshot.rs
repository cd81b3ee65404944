//! Peripheral state shapes.
//!
//! Every peripheral kind reports a flat JSON record of flags and readings.
//! The data service persists those records and hands them back with an
//! `id` and a `created_at` timestamp attached, using its own column names
//! (`is_enabled` instead of `enabled`).

use std::fmt::Debug;

use jiff::Timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Observed state of one peripheral kind.
///
/// `Default` doubles as the zero value: every flag off and every reading
/// zero. It is what callers get back alongside an error.
pub trait Snapshot:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + Debug + Send + Sync + 'static
{
    /// The persisted counterpart served by the data service.
    type Logged: LoggedSnapshot<State = Self>;

    fn zero() -> Self {
        Self::default()
    }
}

/// A snapshot as stored by the data service.
pub trait LoggedSnapshot:
    Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync + 'static
{
    type State: Snapshot;

    fn id(&self) -> i64;
    fn created_at(&self) -> Timestamp;
    /// Projects the record back onto the state it was logged from.
    fn state(&self) -> Self::State;
}

/// Presence, gas and door sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorState {
    pub enabled: bool,
    pub detected: bool,
}

/// Switchable device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub enabled: bool,
}

/// Air-conditioning unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateState {
    pub enabled: bool,
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity percentage
    pub humidity: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorLog {
    pub id: i64,
    pub created_at: Timestamp,
    pub is_enabled: bool,
    pub detected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLog {
    pub id: i64,
    pub created_at: Timestamp,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateLog {
    pub id: i64,
    pub created_at: Timestamp,
    pub is_enabled: bool,
    pub temperature: f32,
    pub humidity: f32,
}

impl Snapshot for SensorState {
    type Logged = SensorLog;
}

impl Snapshot for DeviceState {
    type Logged = DeviceLog;
}

impl Snapshot for ClimateState {
    type Logged = ClimateLog;
}

impl LoggedSnapshot for SensorLog {
    type State = SensorState;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn state(&self) -> SensorState {
        SensorState {
            enabled: self.is_enabled,
            detected: self.detected,
        }
    }
}

impl LoggedSnapshot for DeviceLog {
    type State = DeviceState;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn state(&self) -> DeviceState {
        DeviceState {
            enabled: self.is_enabled,
        }
    }
}

impl LoggedSnapshot for ClimateLog {
    type State = ClimateState;

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn state(&self) -> ClimateState {
        ClimateState {
            enabled: self.is_enabled,
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }
}
