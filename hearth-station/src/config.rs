use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hearth_core::{PeripheralKind, PeripheralRef};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::logs::DEFAULT_CAPACITY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {key}: {reason}")]
    Env { key: String, reason: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data_service: DataServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_peripherals")]
    pub peripherals: Vec<PeripheralConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address for the HTTP server to listen on
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataServiceConfig {
    /// Base address of the data logging service
    #[serde(default = "default_data_service_address")]
    pub address: String,
    /// Number of snapshots that may wait for delivery
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Limits applied to every outbound request.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeripheralConfig {
    /// Name used in log records and data service paths
    pub name: String,
    pub kind: PeripheralKind,
    /// Base address of the peripheral's HTTP service
    pub address: String,
    /// Route prefix on the gateway, `/{name}` when unset
    pub route: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies deployment overrides: `ADDRESS` for the listen address,
    /// `DATA_SERVICE_ADDRESS`, and `<NAME>_ADDRESS` per peripheral
    /// (`gasSensor` reads `GAS_SENSOR_ADDRESS`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ADDRESS").filter(|v| !v.is_empty()) {
            self.server.http_addr = parse_listen_addr(&addr).ok_or_else(|| ConfigError::Env {
                key: "ADDRESS".to_string(),
                reason: format!("{addr:?} is not a socket address"),
            })?;
        }

        if let Some(addr) = lookup("DATA_SERVICE_ADDRESS").filter(|v| !v.is_empty()) {
            self.data_service.address = addr;
        }

        for peripheral in &mut self.peripherals {
            let key = env_key(&peripheral.name);
            if let Some(addr) = lookup(&key).filter(|v| !v.is_empty()) {
                peripheral.address = addr;
            }
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.data_service_url()?;

        if self.data_service.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "data_service.queue_capacity must be greater than zero".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http timeouts must be greater than zero".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut routes = HashSet::new();
        for peripheral in &self.peripherals {
            peripheral.peripheral_ref()?;

            if !names.insert(peripheral.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate peripheral name {:?}",
                    peripheral.name
                )));
            }

            let route = peripheral.route();
            if !route.starts_with('/') || route == "/" {
                return Err(ConfigError::Invalid(format!(
                    "route {route:?} of {:?} must start with '/' and not be the root",
                    peripheral.name
                )));
            }
            if !routes.insert(route.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate route {route:?}")));
            }
        }

        Ok(())
    }

    pub fn data_service_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.data_service.address).map_err(|e| {
            ConfigError::Invalid(format!(
                "data_service.address {:?}: {e}",
                self.data_service.address
            ))
        })
    }
}

impl PeripheralConfig {
    pub fn route(&self) -> String {
        self.route
            .clone()
            .unwrap_or_else(|| format!("/{}", self.name))
    }

    pub fn peripheral_ref(&self) -> Result<PeripheralRef, ConfigError> {
        if !is_path_segment(&self.name) {
            return Err(ConfigError::Invalid(format!(
                "peripheral name {:?} must be non-empty and use only ASCII letters, digits, '-', '_' or '.'",
                self.name
            )));
        }

        let address = Url::parse(&self.address).map_err(|e| {
            ConfigError::Invalid(format!("address of {:?} ({:?}): {e}", self.name, self.address))
        })?;
        Ok(PeripheralRef::new(self.name.as_str(), address))
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data_service: DataServiceConfig::default(),
            http: HttpConfig::default(),
            peripherals: default_peripherals(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            address: default_data_service_address(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_data_service_address() -> String {
    "http://localhost:8087".to_string()
}

fn default_queue_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    2
}

fn default_peripherals() -> Vec<PeripheralConfig> {
    [
        ("presenceSensor", 8081),
        ("gasSensor", 8082),
        ("doorsSensor", 8083),
    ]
    .into_iter()
    .map(|(name, port)| PeripheralConfig {
        name: name.to_string(),
        kind: PeripheralKind::Sensor,
        address: format!("http://localhost:{port}"),
        route: None,
    })
    .collect()
}

/// Names end up verbatim in peripheral and data service paths.
fn is_path_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Accepts `host:port` as well as the bare `:port` form.
fn parse_listen_addr(value: &str) -> Option<SocketAddr> {
    if let Some(port) = value.strip_prefix(':') {
        let port = port.parse::<u16>().ok()?;
        return Some(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    value.parse().ok()
}

/// `gasSensor` -> `GAS_SENSOR_ADDRESS`
fn env_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 8);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            key.push('_');
        }
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_uppercase());
        } else {
            key.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    key.push_str("_ADDRESS");
    key
}
