use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::LogError;

use super::LogForwarder;

/// Default number of snapshots that may wait for delivery.
pub const DEFAULT_CAPACITY: usize = 256;

/// A snapshot already encoded for the data service.
#[derive(Debug)]
pub(crate) struct LogEntry {
    peripheral: Box<str>,
    payload: Vec<u8>,
}

/// Sending half of the log pipeline.
///
/// Submitting never waits on the data service: entries go into a bounded
/// channel drained by a single [`LogWorker`]. A full or closed queue drops
/// the entry and records a warning.
#[derive(Clone)]
pub struct LogQueue {
    sender: mpsc::Sender<LogEntry>,
}

/// Background task that delivers queued snapshots through a [`LogForwarder`].
pub struct LogWorker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl LogQueue {
    /// Spawns the delivery worker on the current runtime.
    pub fn spawn(forwarder: LogForwarder, capacity: usize) -> (Self, LogWorker) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(forwarder, receiver, cancel.clone()));

        (Self { sender }, LogWorker { cancel, handle })
    }

    /// Enqueues `snapshot` for delivery. Failures are logged, not returned.
    pub fn submit<S: Serialize + ?Sized>(&self, peripheral: &str, snapshot: &S) {
        if let Err(e) = self.try_submit(peripheral, snapshot) {
            warn!(peripheral, error = %e, "dropping snapshot log");
        }
    }

    pub fn try_submit<S: Serialize + ?Sized>(
        &self,
        peripheral: &str,
        snapshot: &S,
    ) -> Result<(), LogError> {
        let entry = LogEntry {
            peripheral: peripheral.into(),
            payload: serde_json::to_vec(snapshot)?,
        };

        self.sender.try_send(entry).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => LogError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => LogError::QueueClosed,
        })
    }
}

impl LogWorker {
    /// Stops accepting entries, delivers whatever is already queued and
    /// waits for the worker to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            error!(error = ?e, "log worker panicked");
        }
    }
}

async fn run(
    forwarder: LogForwarder,
    mut receiver: mpsc::Receiver<LogEntry>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            entry = receiver.recv() => match entry {
                Some(entry) => deliver(&forwarder, entry).await,
                None => break,
            },
            _ = cancel.cancelled() => break,
        }
    }

    receiver.close();
    let mut drained = 0u32;
    while let Some(entry) = receiver.recv().await {
        deliver(&forwarder, entry).await;
        drained += 1;
    }

    info!(drained, "log worker stopped");
}

async fn deliver(forwarder: &LogForwarder, entry: LogEntry) {
    match forwarder
        .forward_encoded(&entry.peripheral, entry.payload)
        .await
    {
        Ok(()) => debug!(peripheral = %entry.peripheral, "snapshot logged"),
        Err(e) => warn!(
            peripheral = %entry.peripheral,
            error = %e,
            "Failed to send logs to data service"
        ),
    }
}

#[cfg(test)]
mod tests {
    use hearth_core::SensorState;
    use url::Url;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn detached(capacity: usize) -> (LogQueue, mpsc::Receiver<LogEntry>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (LogQueue { sender }, receiver)
    }

    #[test]
    fn full_queue_rejects_entry() {
        let (queue, _receiver) = detached(1);
        let state = SensorState::default();

        queue.try_submit("gasSensor", &state).unwrap();
        assert!(matches!(
            queue.try_submit("gasSensor", &state),
            Err(LogError::QueueFull)
        ));
    }

    #[test]
    fn closed_queue_rejects_entry() {
        let (queue, receiver) = detached(4);
        drop(receiver);

        assert!(matches!(
            queue.try_submit("gasSensor", &SensorState::default()),
            Err(LogError::QueueClosed)
        ));
    }

    #[test]
    fn entry_carries_encoded_snapshot() {
        let (queue, mut receiver) = detached(4);
        queue.submit(
            "doorsSensor",
            &SensorState {
                enabled: true,
                detected: true,
            },
        );

        let entry = receiver.try_recv().unwrap();
        assert_eq!(&*entry.peripheral, "doorsSensor");
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&entry.payload).unwrap(),
            serde_json::json!({"enabled": true, "detected": true})
        );
    }

    #[tokio::test]
    async fn shutdown_delivers_queued_entries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/presenceSensor/add"))
            .and(body_json(serde_json::json!({"enabled": true, "detected": false})))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let forwarder =
            LogForwarder::new(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
        let (queue, worker) = LogQueue::spawn(forwarder, 8);

        let state = SensorState {
            enabled: true,
            detected: false,
        };
        queue.submit("presenceSensor", &state);
        queue.submit("presenceSensor", &state);
        worker.shutdown().await;

        assert!(matches!(
            queue.try_submit("presenceSensor", &state),
            Err(LogError::QueueClosed)
        ));
        server.verify().await;
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stop_worker() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/broken/add"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/healthy/add"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let forwarder =
            LogForwarder::new(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
        let (queue, worker) = LogQueue::spawn(forwarder, 8);

        queue.submit("broken", &SensorState::default());
        queue.submit("healthy", &SensorState::default());
        worker.shutdown().await;

        server.verify().await;
    }
}
