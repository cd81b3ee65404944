use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of one exchange with a peripheral or with the data service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The remote end could not be reached (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The remote end answered with any status other than 200.
    #[error("{peripheral}: {body}")]
    Upstream {
        peripheral: String,
        status: StatusCode,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("parsing failed")]
    Decoding,
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "transport",
            GatewayError::Upstream { .. } => "upstream",
            GatewayError::Decoding => "decoding",
        }
    }
}

/// A failed request together with the zero value handed back in place of a
/// decoded snapshot.
#[derive(Debug)]
pub struct RequestFailure<S> {
    pub fallback: S,
    pub error: GatewayError,
}

impl<S> RequestFailure<S> {
    pub fn new(fallback: S, error: GatewayError) -> Self {
        Self { fallback, error }
    }

    pub fn fallback(&self) -> &S {
        &self.fallback
    }

    pub fn error(&self) -> &GatewayError {
        &self.error
    }

    pub fn into_error(self) -> GatewayError {
        self.error
    }

    pub fn into_parts(self) -> (S, GatewayError) {
        (self.fallback, self.error)
    }
}

impl<S> fmt::Display for RequestFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<S: fmt::Debug> std::error::Error for RequestFailure<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Failure while persisting a snapshot to the data service. Never surfaces
/// to the caller of a peripheral request; it only ends up in the logs.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to encode snapshot: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("data service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{peripheral}: {body}")]
    Upstream {
        peripheral: String,
        status: StatusCode,
        body: String,
    },

    #[error("unreadable acknowledgement from data service: {0}")]
    Acknowledgement(#[source] reqwest::Error),

    #[error("log queue is full")]
    QueueFull,

    #[error("log queue is closed")]
    QueueClosed,
}
