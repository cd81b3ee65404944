pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logs;
pub mod peripheral;

use axum::Router;
use thiserror::Error;
use tracing::info;

use crate::client::PeripheralClient;
use crate::config::{Config, ConfigError, HttpConfig};
use crate::logs::{LogForwarder, LogQueue, LogReader, LogWorker};
use crate::peripheral::AnyPeripheral;

pub use crate::error::{GatewayError, LogError, RequestFailure};

#[derive(Debug, Error)]
pub enum StationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// A wired-up gateway: the HTTP router and the worker delivering snapshot
/// logs in the background.
pub struct Station {
    pub router: Router,
    pub log_worker: LogWorker,
}

impl Station {
    /// Builds every peripheral binding from `config`. Must be called from
    /// within a Tokio runtime since it spawns the log worker.
    pub fn from_config(config: &Config) -> Result<Self, StationError> {
        config.validate()?;

        let http = http_client(&config.http)?;
        let data_service = config.data_service_url()?;

        let (queue, log_worker) = LogQueue::spawn(
            LogForwarder::new(http.clone(), data_service.clone()),
            config.data_service.queue_capacity,
        );
        let client = PeripheralClient::new(http.clone(), queue);
        let reader = LogReader::new(http, data_service);

        let mut peripherals = Vec::with_capacity(config.peripherals.len());
        for entry in &config.peripherals {
            let peripheral = AnyPeripheral::new(
                entry.kind,
                entry.peripheral_ref()?,
                client.clone(),
                reader.clone(),
            );
            peripherals.push((entry.route(), peripheral));
        }

        info!(
            peripherals = peripherals.len(),
            data_service = %config.data_service.address,
            "station configured"
        );

        Ok(Self {
            router: api::router(peripherals),
            log_worker,
        })
    }
}

/// Shared outbound client. Every peripheral and data service call is bounded
/// by the configured timeouts.
pub fn http_client(config: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
}
