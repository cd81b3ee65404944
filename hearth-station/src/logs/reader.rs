use hearth_core::LoggedSnapshot;
use tracing::{debug, warn};
use url::Url;

use crate::client::read_json;
use crate::error::GatewayError;

use super::data_service_url;

/// Reads persisted snapshot history from `{data_service}/{peripheral}/latest`.
#[derive(Clone)]
pub struct LogReader {
    http: reqwest::Client,
    base: Url,
}

impl LogReader {
    pub fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    /// The `limit` most recent records for `peripheral`, in the order the
    /// data service returns them. `limit` is passed through as-is.
    pub async fn fetch_recent<L: LoggedSnapshot>(
        &self,
        peripheral: &str,
        limit: i64,
    ) -> Result<Vec<L>, GatewayError> {
        let url = data_service_url(&self.base, peripheral, &format!("latest?limit={limit}"));
        debug!(peripheral, %url, "fetching logs");

        let response = self.http.get(url).send().await.map_err(|e| {
            warn!(peripheral, error = %e, "data service unreachable");
            GatewayError::Transport(e)
        })?;

        read_json(peripheral, response).await
    }
}
