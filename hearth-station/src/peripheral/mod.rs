//! Per-kind bindings of the request engine.
//!
//! A [`PeripheralService`] ties one peripheral to the shared client and log
//! reader. The operations every kind supports live here; kind-specific ones
//! are inherent impls in the sibling modules.

mod climate;
mod sensor;

use std::marker::PhantomData;

use hearth_core::{
    ClimateState, DeviceState, PeripheralKind, PeripheralRef, SensorState, Snapshot, endpoint,
};

use crate::client::PeripheralClient;
use crate::error::{GatewayError, RequestFailure};
use crate::logs::LogReader;

pub type SensorService = PeripheralService<SensorState>;
pub type DeviceService = PeripheralService<DeviceState>;
pub type ClimateService = PeripheralService<ClimateState>;

pub struct PeripheralService<S> {
    peripheral: PeripheralRef,
    client: PeripheralClient,
    reader: LogReader,
    _shape: PhantomData<fn() -> S>,
}

impl<S> Clone for PeripheralService<S> {
    fn clone(&self) -> Self {
        Self {
            peripheral: self.peripheral.clone(),
            client: self.client.clone(),
            reader: self.reader.clone(),
            _shape: PhantomData,
        }
    }
}

impl<S: Snapshot> PeripheralService<S> {
    pub fn new(peripheral: PeripheralRef, client: PeripheralClient, reader: LogReader) -> Self {
        Self {
            peripheral,
            client,
            reader,
            _shape: PhantomData,
        }
    }

    pub fn peripheral(&self) -> &PeripheralRef {
        &self.peripheral
    }

    pub async fn info(&self) -> Result<S, RequestFailure<S>> {
        self.client
            .query(&self.peripheral, endpoint::INFO, S::zero())
            .await
    }

    pub async fn toggle_enabled(&self) -> Result<S, RequestFailure<S>> {
        self.client
            .command(&self.peripheral, endpoint::ENABLED, S::zero())
            .await
    }

    pub async fn logs(&self, limit: i64) -> Result<Vec<S::Logged>, GatewayError> {
        self.reader
            .fetch_recent(self.peripheral.name(), limit)
            .await
    }
}

/// A configured peripheral of any kind.
#[derive(Clone)]
pub enum AnyPeripheral {
    Sensor(SensorService),
    Device(DeviceService),
    Climate(ClimateService),
}

impl AnyPeripheral {
    pub fn new(
        kind: PeripheralKind,
        peripheral: PeripheralRef,
        client: PeripheralClient,
        reader: LogReader,
    ) -> Self {
        match kind {
            PeripheralKind::Sensor => {
                AnyPeripheral::Sensor(PeripheralService::new(peripheral, client, reader))
            }
            PeripheralKind::Device => {
                AnyPeripheral::Device(PeripheralService::new(peripheral, client, reader))
            }
            PeripheralKind::Climate => {
                AnyPeripheral::Climate(PeripheralService::new(peripheral, client, reader))
            }
        }
    }

    pub fn kind(&self) -> PeripheralKind {
        match self {
            AnyPeripheral::Sensor(_) => PeripheralKind::Sensor,
            AnyPeripheral::Device(_) => PeripheralKind::Device,
            AnyPeripheral::Climate(_) => PeripheralKind::Climate,
        }
    }

    pub fn peripheral(&self) -> &PeripheralRef {
        match self {
            AnyPeripheral::Sensor(s) => s.peripheral(),
            AnyPeripheral::Device(s) => s.peripheral(),
            AnyPeripheral::Climate(s) => s.peripheral(),
        }
    }
}
