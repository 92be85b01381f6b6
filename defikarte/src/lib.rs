//! # Defikarte - AED locations on OpenStreetMap
//!
//! Library behind the Defikarte backend. It reads defibrillator (AED)
//! locations from an Overpass instance and adds new ones to OpenStreetMap
//! through the changeset-based editing API.
//!
//! ## Features
//!
//! - **Query**: all `emergency=defibrillator` nodes of a region in one call
//! - **Submit**: maps a simple request onto OSM tags and runs the changeset
//!   workflow (open, create node, close, re-fetch)
//! - **Stateless**: clients are created per call, nothing is cached
//!
//! ## Quick Start
//!
//! ```ignore
//! use defikarte::{ConfigBuilder, DefibrillatorService};
//!
//! let config = ConfigBuilder::from_env().build();
//! let service = DefibrillatorService::new(config);
//!
//! for aed in service.all_defibrillators().await? {
//!     println!("{} {:?} {:?}", aed.id, aed.lat, aed.lon);
//! }
//! ```
//!
//! ## Tagging
//!
//! A submitted [`DefibrillatorRequest`] becomes a node tagged with
//! `emergency=defibrillator`, `emergency:phone`, `defibrillator:location`,
//! `opening_hours`, `phone`, `operator`, `access` and `indoor`.
//! See [`tagging`] for the exact mapping.

pub mod config;
pub mod connector;
pub mod error;
pub mod model;
pub mod osm;
pub mod overpass;
pub mod service;
pub mod tagging;

#[cfg(feature = "geojson")]
pub mod geojson;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// `User-Agent` sent with every outgoing request.
pub const USER_AGENT_VALUE: &str = concat!("defikarte/", env!("CARGO_PKG_VERSION"));

// Re-export main types at crate root for convenience
pub use config::{Config, ConfigBuilder, Region};
pub use connector::HttpConnector;
pub use error::{DefikarteError, ErrorKind, Result};
pub use model::{Changeset, ChangesetId, DefibrillatorRequest, GeoNode, NodeId, Tags};
pub use osm::{OsmApiClient, OsmConnector, OsmEditor};
pub use overpass::{DefibrillatorSource, OverpassClient, OverpassConnector, OverpassElement};
pub use service::DefibrillatorService;
