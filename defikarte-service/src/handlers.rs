//! HTTP request handlers for the defibrillator service.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use defikarte::{DefikarteError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;

/// Error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Get all defibrillators of the served region.
///
/// The result set of the Overpass query is returned as-is.
///
/// # Returns
///
/// - `200 OK` with the list of OSM elements
/// - `500 Internal Server Error` if the query service fails
#[utoipa::path(
    get,
    path = "/defibrillator",
    tag = "defibrillator",
    responses(
        (status = 200, description = "All AEDs of the region", body = Vec<serde_json::Value>),
        (status = 500, description = "Query service failed", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_defibrillators(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.defibrillator_service.all_defibrillators().await {
        Ok(elements) => {
            tracing::info!(count = elements.len(), "Defibrillators found");
            (StatusCode::OK, Json(elements)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Add a new defibrillator to OpenStreetMap.
///
/// The body is a JSON `DefibrillatorRequest`. A changeset is opened, the
/// node created, the changeset closed and the stored node returned.
///
/// # Returns
///
/// - `201 Created` with the node as stored by OSM
/// - `400 Bad Request` if the body is empty or not a valid request
/// - `500 Internal Server Error` if the server is misconfigured or OSM fails
#[utoipa::path(
    post,
    path = "/defibrillator",
    tag = "defibrillator",
    request_body(
        content = String,
        content_type = "application/json",
        description = "DefibrillatorRequest: latitude, longitude, emergencyPhone, location, \
                       openingHours, operatorPhone, operatorName, accessible, indoor"
    ),
    responses(
        (status = 201, description = "Node created", body = serde_json::Value),
        (status = 400, description = "Empty or malformed body", body = ErrorResponse),
        (status = 500, description = "Missing configuration or OSM failure", body = ErrorResponse)
    )
)]
pub async fn post_defibrillator(State(state): State<Arc<AppState>>, body: String) -> Response {
    tracing::debug!(body = %body, "Create defibrillator request");

    match state.defibrillator_service.create_defibrillator(&body).await {
        Ok(node) => (StatusCode::CREATED, Json(node)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Translate a library error into an HTTP response.
fn error_response(e: DefikarteError) -> Response {
    let status = match e.kind() {
        ErrorKind::ClientInput => {
            tracing::info!(error = %e, "Rejected request");
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Configuration => {
            tracing::warn!(error = %e, "Service is not configured for OSM edits");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ErrorKind::Upstream => {
            tracing::error!(error = ?e, "Upstream request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let response = error_response(DefikarteError::EmptyBody);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(DefikarteError::MissingConfiguration { key: "osmApiUrl" });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error_response(DefikarteError::Http {
            url: "https://api.openstreetmap.org/api/0.6/node/create".to_string(),
            status: 409,
            message: "The changeset 1 was closed".to_string(),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_health_response_serialize() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }
}
