use crate::api::handlers::{commands, dashboard, health, readings};
use crate::api::middleware::require_same_origin;
use crate::services::DashboardService;
use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Level;

pub fn create_router(service: DashboardService) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/", get(dashboard::page));

    let api_routes = Router::new()
        .route("/api/v1/dashboard", get(dashboard::snapshot))
        .route("/api/v1/readings", get(readings::list))
        .route("/api/v1/energy/total", get(readings::energy_total));

    // Writes stay off the permissive CORS layer
    let command_routes = Router::new()
        .route("/commands/{command}", post(commands::submit_form))
        .route("/api/v1/commands", post(commands::create))
        .route_layer(middleware::from_fn(require_same_origin));

    let read_routes = Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(tower_http::cors::CorsLayer::permissive());

    Router::new()
        .merge(read_routes)
        .merge(command_routes)
        .with_state(service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|_request: &Request, _span: &tracing::Span| {
                    tracing::event!(Level::DEBUG, "received request");
                })
                .on_response(
                    |_response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::DEBUG, latency = ?latency, "request completed");
                    },
                )
                .on_failure(
                    |_error: tower_http::classify::ServerErrorsFailureClass,
                     _latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::ERROR, "request failed");
                    },
                ),
        )
}
