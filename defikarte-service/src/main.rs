//! Defikarte Service - HTTP backend for AED locations on OpenStreetMap.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DEFIKARTE_OVERPASS_URL` | Overpass API base address | `https://overpass-api.de/api` |
//! | `DEFIKARTE_REGION` | ISO 3166-1 code of the served region | `CH` |
//! | `DEFIKARTE_OSM_API_URL` | OSM API server address | Required for submissions |
//! | `DEFIKARTE_OSM_USERNAME` | OSM account used for edits | Required for submissions |
//! | `DEFIKARTE_OSM_USER_PASSWORD` | Password of that account | Required for submissions |
//! | `DEFIKARTE_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /defibrillator` - All AEDs of the region
//! - `POST /defibrillator` - Add a new AED
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use defikarte::{ConfigBuilder, DefibrillatorService};
use defikarte_service::{handlers, router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the Defikarte service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Defikarte Service",
        version = "0.1.0",
        description = "Read and submit defibrillator (AED) locations on OpenStreetMap.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_defibrillators,
        handlers::post_defibrillator,
        handlers::health_check,
    ),
    components(schemas(handlers::ErrorResponse, handlers::HealthResponse)),
    tags(
        (name = "defibrillator", description = "AED query and submission endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "defikarte_service=info,defikarte=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("DEFIKARTE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let config = ConfigBuilder::from_env().build();
    if let Err(e) = config.osm_credentials() {
        tracing::warn!(error = %e, "OSM edits are disabled until configured");
    }

    tracing::info!(
        overpass_url = config.overpass_url(),
        region = config.region().iso3166_1(),
        osm_api_url = config.osm_api_url().unwrap_or("-"),
        port = port,
        "Starting Defikarte service"
    );

    let state = Arc::new(AppState {
        defibrillator_service: DefibrillatorService::new(config),
    });

    // Build router
    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
