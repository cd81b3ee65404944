// History queries and forwarding against a mocked data service.

use hearth_core::{ClimateLog, ClimateState, DeviceLog, LoggedSnapshot, SensorLog, SensorState};
use hearth_station::logs::{LogForwarder, LogReader};
use hearth_station::{GatewayError, LogError};
use jiff::Timestamp;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, LogReader, LogForwarder) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let http = reqwest::Client::new();
    (
        server,
        LogReader::new(http.clone(), base.clone()),
        LogForwarder::new(http, base),
    )
}

fn ts(value: &str) -> Timestamp {
    value.parse().unwrap()
}

#[tokio::test]
async fn fetch_recent_preserves_backend_order() {
    let (server, reader, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/gasSensor/latest"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "created_at": "2023-01-01T00:00:00Z", "is_enabled": true, "detected": false},
            {"id": 2, "created_at": "2023-01-02T00:00:00Z", "is_enabled": false, "detected": false},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let logs: Vec<SensorLog> = reader.fetch_recent("gasSensor", 2).await.unwrap();

    assert_eq!(
        logs,
        vec![
            SensorLog {
                id: 1,
                created_at: ts("2023-01-01T00:00:00Z"),
                is_enabled: true,
                detected: false,
            },
            SensorLog {
                id: 2,
                created_at: ts("2023-01-02T00:00:00Z"),
                is_enabled: false,
                detected: false,
            },
        ]
    );
}

#[tokio::test]
async fn empty_history_is_not_an_error() {
    let (server, reader, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lamp/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let logs: Vec<DeviceLog> = reader.fetch_recent("lamp", 2).await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn limit_is_passed_through_unvalidated() {
    let (server, reader, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/lamp/latest"))
        .and(query_param("limit", "-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let logs: Vec<DeviceLog> = reader.fetch_recent("lamp", -5).await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn backend_failure_is_upstream_error() {
    let (server, reader, _) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let err = reader
        .fetch_recent::<SensorLog>("gasSensor", 2)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Upstream { .. }));
    assert_eq!(err.to_string(), "gasSensor: db down");
}

#[tokio::test]
async fn non_200_history_is_upstream_error() {
    let (server, reader, _) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = reader.fetch_recent::<DeviceLog>("lamp", 2).await.unwrap_err();
    assert!(matches!(err, GatewayError::Upstream { status, .. } if status.as_u16() == 202));
}

#[tokio::test]
async fn malformed_history_is_decoding_error() {
    let (server, reader, _) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&server)
        .await;

    let err = reader
        .fetch_recent::<DeviceLog>("lamp", 2)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Decoding));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let reader = LogReader::new(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1").unwrap(),
    );
    let err = reader
        .fetch_recent::<SensorLog>("gasSensor", 2)
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn forward_posts_snapshot_json() {
    let (server, _, forwarder) = setup().await;
    Mock::given(method("POST"))
        .and(path("/gasSensor/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    forwarder
        .forward(
            "gasSensor",
            &SensorState {
                enabled: true,
                detected: false,
            },
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({"enabled": true, "detected": false}));
    assert_eq!(
        requests[0]
            .headers
            .get("content-type")
            .map(|v| v.to_str().unwrap()),
        Some("application/json")
    );
}

#[tokio::test]
async fn forward_reports_rejection() {
    let (server, _, forwarder) = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("cannot insert"))
        .mount(&server)
        .await;

    let err = forwarder
        .forward("lamp", &json!({"enabled": true}))
        .await
        .unwrap_err();
    match err {
        LogError::Upstream { peripheral, body, .. } => {
            assert_eq!(peripheral, "lamp");
            assert_eq!(body, "cannot insert");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn forward_requires_200_acknowledgement() {
    let (server, _, forwarder) = setup().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let err = forwarder
        .forward("lamp", &json!({"enabled": true}))
        .await
        .unwrap_err();
    assert!(matches!(err, LogError::Upstream { status, .. } if status.as_u16() == 201));
}

#[tokio::test]
async fn forward_reports_unreachable_backend() {
    let forwarder = LogForwarder::new(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:1").unwrap(),
    );
    let err = forwarder
        .forward("lamp", &json!({"enabled": true}))
        .await
        .unwrap_err();
    assert!(matches!(err, LogError::Transport(_)));
}

/// Simulates the data service add/latest pair: whatever was posted comes
/// back with metadata attached and the same state fields.
#[tokio::test]
async fn forwarded_snapshot_reads_back_unchanged() {
    let (server, reader, forwarder) = setup().await;
    Mock::given(method("POST"))
        .and(path("/acUnit/add"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let original = ClimateState {
        enabled: true,
        temperature: 21.5,
        humidity: 40.0,
    };
    forwarder.forward("acUnit", &original).await.unwrap();

    let posted: serde_json::Value =
        serde_json::from_slice(&server.received_requests().await.unwrap()[0].body).unwrap();
    Mock::given(method("GET"))
        .and(path("/acUnit/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 42,
            "created_at": "2024-03-01T12:00:00Z",
            "is_enabled": posted["enabled"],
            "temperature": posted["temperature"],
            "humidity": posted["humidity"],
        }])))
        .mount(&server)
        .await;

    let logs: Vec<ClimateLog> = reader.fetch_recent("acUnit", 1).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id(), 42);
    assert_eq!(logs[0].state(), original);
}
