//! Defikarte Service Library
//!
//! HTTP handlers and router of the defibrillator backend.
//! This library is used by both the defikarte-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use defikarte::DefibrillatorService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers.
pub struct AppState {
    /// Service running AED queries and submissions.
    pub defibrillator_service: DefibrillatorService,
}

/// Build the application router.
///
/// ```text
/// GET  /defibrillator  all AEDs of the region
/// POST /defibrillator  add a new AED
/// GET  /health         health check
/// ```
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/defibrillator",
            get(handlers::get_defibrillators).post(handlers::post_defibrillator),
        )
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{ErrorResponse, HealthResponse};
