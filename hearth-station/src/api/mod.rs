pub mod error;
pub mod handlers;

use std::time::Duration;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, patch},
};
use hearth_core::{Snapshot, endpoint};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::peripheral::{AnyPeripheral, ClimateService, PeripheralService, SensorService};

pub use error::{ApiError, ErrorResponse};

const LOGS: &str = "/logs";

/// Gateway router: one route group per peripheral plus `/health`.
pub fn router<I>(peripherals: I) -> Router
where
    I: IntoIterator<Item = (String, AnyPeripheral)>,
{
    let mut app = Router::new().route("/health", get(health_handler));

    for (route, peripheral) in peripherals {
        info!(
            %route,
            peripheral = peripheral.peripheral().name(),
            kind = %peripheral.kind(),
            "mounting peripheral"
        );
        let group = match peripheral {
            AnyPeripheral::Sensor(service) => sensor_router(service),
            AnyPeripheral::Device(service) => common_routes().with_state(service),
            AnyPeripheral::Climate(service) => climate_router(service),
        };
        app = app.nest(&route, group);
    }

    app.layer(cors()).layer(TraceLayer::new_for_http())
}

fn common_routes<S: Snapshot>() -> Router<PeripheralService<S>> {
    Router::new()
        .route(endpoint::INFO, get(handlers::info::<S>))
        .route(endpoint::ENABLED, patch(handlers::toggle_enabled::<S>))
        .route(LOGS, get(handlers::logs::<S>))
}

fn sensor_router(service: SensorService) -> Router {
    common_routes()
        .route(endpoint::DETECTED, patch(handlers::toggle_detected))
        .with_state(service)
}

fn climate_router(service: ClimateService) -> Router {
    common_routes()
        .route(endpoint::UPDATE, patch(handlers::update_settings))
        .with_state(service)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60))
}

async fn health_handler() -> &'static str {
    "OK"
}
