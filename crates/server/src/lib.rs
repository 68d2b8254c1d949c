//! healthbuddy-server library crate
//!
//! Exposes `build_app`, `build_buddy`, the dispatcher and `config` for
//! integration tests. The actual binary entrypoint is in `main.rs`.

pub mod ai;
pub mod config;
mod error;
mod middleware;
mod routes;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use healthbuddy_core::{AdapterError, DoctorDirectory};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Arc, OnceLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ai::{HealthBuddy, OpenAiClient, TavilyClient};
use config::Config;
pub use routes::health::KeyStatus;

/// Wire the hosted-API clients and the default doctor roster into a dispatcher.
///
/// Missing credentials are allowed here; the affected adapter then fails per
/// call and the dispatcher degrades.
pub fn build_buddy(config: &Config) -> Result<HealthBuddy, AdapterError> {
    let llm = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
        config.request_timeout(),
    )?;
    let search = TavilyClient::new(
        config.tavily_api_key.clone(),
        config.tavily_base_url.clone(),
        config.request_timeout(),
    )?;

    Ok(HealthBuddy::new(
        Arc::new(llm),
        Arc::new(search),
        DoctorDirectory::with_defaults(),
    ))
}

/// Handle of the process-wide Prometheus recorder.
///
/// The recorder is installed on first use; every later router (e.g. in
/// integration tests) renders the same installed recorder.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("A metrics recorder was already installed; /metrics will be empty");
            }
            handle
        })
        .clone()
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// around fake adapters without binding to a TCP port.
pub fn build_app(buddy: HealthBuddy, config: &Config) -> Router {
    let (configured, message) = config.key_status();
    let keys = KeyStatus {
        configured,
        message,
    };

    let prometheus_handle = prometheus_handle();

    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(keys))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .merge(routes::api_routes())
        .with_state(buddy)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
