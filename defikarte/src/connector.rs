//! Connectors producing real HTTP clients.

use crate::error::Result;
use crate::osm::{OsmApiClient, OsmConnector, OsmEditor};
use crate::overpass::{DefibrillatorSource, OverpassClient, OverpassConnector};

/// Builds a fresh reqwest-backed client for every call.
///
/// Clients are not pooled or cached between requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl OverpassConnector for HttpConnector {
    fn connect(&self, base_url: &str) -> Result<Box<dyn DefibrillatorSource>> {
        Ok(Box::new(OverpassClient::new(base_url)?))
    }
}

impl OsmConnector for HttpConnector {
    fn basic_auth(
        &self,
        api_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn OsmEditor>> {
        Ok(Box::new(OsmApiClient::new(api_url, username, password)?))
    }
}
