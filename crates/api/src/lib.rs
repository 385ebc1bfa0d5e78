//! HTTP API server with observability for the inventory and order service.
//!
//! Provides REST endpoints for the product catalog, order placement and
//! order status changes, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use domain::{OrderService, ProductCatalog, TransitionPolicy};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            post(routes::products::create::<S>).get(routes::products::list::<S>),
        )
        .route(
            "/products/{id}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .route(
            "/orders",
            post(routes::orders::create::<S>).get(routes::orders::list::<S>),
        )
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/orders/{id}/status",
            patch(routes::orders::update_status::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .route_layer(axum::middleware::from_fn(middleware::track_http_metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over one store.
pub fn create_default_state<S: Store + Clone + 'static>(
    store: S,
    policy: TransitionPolicy,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        orders: OrderService::with_policy(store.clone(), policy),
        catalog: ProductCatalog::new(store),
    })
}
