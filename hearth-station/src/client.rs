// Generic request engine.
//
// One code path serves every peripheral kind: the snapshot shape is a type
// parameter and the zero value is supplied by the caller, so GET and PATCH
// exchanges classify failures identically regardless of field set.

use hearth_core::{PeripheralRef, Snapshot};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{GatewayError, RequestFailure};
use crate::logs::LogQueue;

/// Issues requests against peripheral services and mirrors every decoded
/// snapshot to the data service.
#[derive(Clone)]
pub struct PeripheralClient {
    http: reqwest::Client,
    logs: LogQueue,
}

impl PeripheralClient {
    pub fn new(http: reqwest::Client, logs: LogQueue) -> Self {
        Self { http, logs }
    }

    /// GET `suffix` on `peripheral`.
    pub async fn query<S: Snapshot>(
        &self,
        peripheral: &PeripheralRef,
        suffix: &str,
        zero: S,
    ) -> Result<S, RequestFailure<S>> {
        let request = self.request(Method::GET, peripheral, suffix);
        self.exchange(peripheral, request, zero).await
    }

    /// PATCH `suffix` on `peripheral` without a body.
    pub async fn command<S: Snapshot>(
        &self,
        peripheral: &PeripheralRef,
        suffix: &str,
        zero: S,
    ) -> Result<S, RequestFailure<S>> {
        let request = self.request(Method::PATCH, peripheral, suffix);
        self.exchange(peripheral, request, zero).await
    }

    /// PATCH `suffix` on `peripheral` with `desired` as the JSON body.
    pub async fn update<S: Snapshot>(
        &self,
        peripheral: &PeripheralRef,
        suffix: &str,
        desired: &S,
        zero: S,
    ) -> Result<S, RequestFailure<S>> {
        let request = self.request(Method::PATCH, peripheral, suffix).json(desired);
        self.exchange(peripheral, request, zero).await
    }

    fn request(&self, method: Method, peripheral: &PeripheralRef, suffix: &str) -> RequestBuilder {
        let url = peripheral.endpoint(suffix);
        debug!(peripheral = peripheral.name(), %method, %url, "sending request");
        self.http.request(method, url)
    }

    async fn exchange<S: Snapshot>(
        &self,
        peripheral: &PeripheralRef,
        request: RequestBuilder,
        zero: S,
    ) -> Result<S, RequestFailure<S>> {
        let result = match request.send().await {
            Ok(response) => read_json::<S>(peripheral.name(), response).await,
            Err(e) => Err(GatewayError::Transport(e)),
        };

        match result {
            Ok(snapshot) => {
                self.logs.submit(peripheral.name(), &snapshot);
                Ok(snapshot)
            }
            Err(error) => {
                warn!(peripheral = peripheral.name(), error = %error, "peripheral request failed");
                Err(RequestFailure::new(zero, error))
            }
        }
    }
}

/// Classifies a response: any status other than 200 becomes `Upstream` with
/// the raw body, an unreadable or mis-shaped body becomes `Decoding`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    name: &str,
    response: Response,
) -> Result<T, GatewayError> {
    let status = response.status();

    let body = response.bytes().await.map_err(|e| {
        debug!(peripheral = name, error = %e, "failed to read response body");
        GatewayError::Decoding
    })?;

    if status != StatusCode::OK {
        return Err(GatewayError::Upstream {
            peripheral: name.to_string(),
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    serde_json::from_slice(&body).map_err(|e| {
        debug!(peripheral = name, error = %e, "response body has unexpected shape");
        GatewayError::Decoding
    })
}
