//! HTTP front door for kubestatus
//!
//! Maps a fixed set of read-only paths onto the cluster facade and renders
//! every outcome, failures included, as JSON.

pub mod error;
pub mod handlers;

use std::any::Any;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use kubestatus_k8s::ClusterFacade;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub facade: ClusterFacade,
}

impl AppState {
    pub fn new(facade: ClusterFacade) -> Self {
        Self { facade }
    }
}

pub fn build_router(state: AppState) -> Router {
    with_layers(routes().with_state(state))
}

fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .route(
            "/cluster-info",
            get(handlers::cluster_info).fallback(handlers::method_not_allowed),
        )
        .route(
            "/nodes",
            get(handlers::nodes).fallback(handlers::method_not_allowed),
        )
        .route(
            "/pods",
            get(handlers::pods).fallback(handlers::method_not_allowed),
        )
        .route(
            "/deployments",
            get(handlers::deployments).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
}

/// Layers shared by every route, applied last so they wrap the fallback too
fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = detail, "request handler panicked");
    ApiError::internal().into_response()
}
