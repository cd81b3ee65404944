use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::LogError;

use super::data_service_url;

/// Posts snapshots to `{data_service}/{peripheral}/add`.
///
/// One attempt per call: no retry, no buffering.
#[derive(Clone)]
pub struct LogForwarder {
    http: reqwest::Client,
    base: Url,
}

impl LogForwarder {
    pub fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    pub async fn forward<S>(&self, peripheral: &str, snapshot: &S) -> Result<(), LogError>
    where
        S: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(snapshot)?;
        self.forward_encoded(peripheral, payload).await
    }

    pub(crate) async fn forward_encoded(
        &self,
        peripheral: &str,
        payload: Vec<u8>,
    ) -> Result<(), LogError> {
        let url = data_service_url(&self.base, peripheral, "add");
        debug!(peripheral, %url, "forwarding snapshot");

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(LogError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LogError::Acknowledgement)?;

        if status != StatusCode::OK {
            return Err(LogError::Upstream {
                peripheral: peripheral.to_string(),
                status,
                body,
            });
        }

        Ok(())
    }
}
