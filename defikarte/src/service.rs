//! Defibrillator service.
//!
//! This module provides [`DefibrillatorService`], which runs the two
//! operations of the backend against the external OSM services:
//!
//! - [`DefibrillatorService::all_defibrillators`] queries Overpass for every
//!   AED in the configured region.
//! - [`DefibrillatorService::create_defibrillator`] adds a new AED through
//!   the OSM changeset workflow: open changeset, create node, close
//!   changeset, fetch the created node.
//!
//! ```ignore
//! use defikarte::{ConfigBuilder, DefibrillatorService};
//!
//! let service = DefibrillatorService::new(ConfigBuilder::from_env().build());
//!
//! let aeds = service.all_defibrillators().await?;
//! let node = service.create_defibrillator(r#"{"latitude": 47.0, "longitude": 8.0}"#).await?;
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::connector::HttpConnector;
use crate::error::{DefikarteError, Result};
use crate::model::{Changeset, DefibrillatorRequest, GeoNode};
use crate::osm::OsmConnector;
use crate::overpass::{OverpassConnector, OverpassElement};
use crate::tagging;

/// Stateless orchestration of AED queries and submissions.
///
/// Every call builds its own client; nothing is cached between calls.
#[derive(Clone)]
pub struct DefibrillatorService {
    config: Config,
    overpass: Arc<dyn OverpassConnector>,
    osm: Arc<dyn OsmConnector>,
}

impl DefibrillatorService {
    /// Create a service talking to the configured servers over HTTP.
    pub fn new(config: Config) -> Self {
        Self::with_connectors(config, Arc::new(HttpConnector), Arc::new(HttpConnector))
    }

    /// Create a service using custom connectors.
    pub fn with_connectors(
        config: Config,
        overpass: Arc<dyn OverpassConnector>,
        osm: Arc<dyn OsmConnector>,
    ) -> Self {
        Self {
            config,
            overpass,
            osm,
        }
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch every defibrillator in the configured region.
    ///
    /// The result set is returned as delivered by Overpass.
    pub async fn all_defibrillators(&self) -> Result<Vec<OverpassElement>> {
        let overpass_url = self.config.overpass_url();
        let region = self.config.region();
        tracing::info!(
            overpass_url,
            region = region.iso3166_1(),
            "Get all AED"
        );

        let source = self.overpass.connect(overpass_url)?;
        source.all_defibrillators(region).await
    }

    /// Add a new defibrillator described by the JSON document `body`.
    ///
    /// # Returns
    ///
    /// The node as stored by the OSM API after the changeset was closed.
    ///
    /// # Errors
    ///
    /// - [`DefikarteError::EmptyBody`] if `body` is empty
    /// - [`DefikarteError::MalformedPayload`] if `body` is not a valid request
    /// - [`DefikarteError::MissingConfiguration`] if OSM credentials are not
    ///   configured; no request is sent in that case
    /// - any upstream error of the OSM API. A changeset that was opened is
    ///   not closed again when creating the node fails.
    pub async fn create_defibrillator(&self, body: &str) -> Result<GeoNode> {
        if body.is_empty() {
            return Err(DefikarteError::EmptyBody);
        }

        let request: DefibrillatorRequest = serde_json::from_str(body)?;
        self.submit(&request).await
    }

    /// Add a new defibrillator from an already parsed request.
    pub async fn submit(&self, request: &DefibrillatorRequest) -> Result<GeoNode> {
        let credentials = self.config.osm_credentials()?;
        tracing::info!(
            osm_api_url = credentials.api_url,
            lat = request.latitude,
            lon = request.longitude,
            "Create new AED node"
        );

        let mut node = tagging::node_for(request);
        let editor = self.osm.basic_auth(
            credentials.api_url,
            credentials.username,
            credentials.password,
        )?;

        let changeset_id = editor
            .create_changeset(&Changeset::create_aed(credentials.username))
            .await?;

        node.changeset = Some(changeset_id);
        let node_id = editor.create_node(changeset_id, &node).await?;

        editor.close_changeset(changeset_id).await?;

        let created = editor.get_node(node_id).await?;
        tracing::info!(node = %node_id, changeset = %changeset_id, "Added new node");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{ChangesetId, NodeId};
    use crate::test_support::{Failure, OsmCall, RecordingOsm, StubOverpass};

    const BODY: &str = r#"{
        "latitude": 47.3769,
        "longitude": 8.5417,
        "emergencyPhone": "144",
        "location": "Schalterhalle",
        "openingHours": "24/7",
        "operatorPhone": "+41 44 000 00 00",
        "operatorName": "SBB",
        "accessible": true,
        "indoor": false
    }"#;

    fn config() -> Config {
        Config::builder()
            .overpass_url("https://overpass.example.org/api")
            .osm_api_url("https://osm.example.org")
            .osm_username("mapper")
            .osm_user_password("secret")
            .build()
    }

    fn service(config: Config, osm: &RecordingOsm) -> DefibrillatorService {
        DefibrillatorService::with_connectors(
            config,
            Arc::new(StubOverpass::empty()),
            Arc::new(osm.clone()),
        )
    }

    #[tokio::test]
    async fn test_create_calls_in_order() {
        let osm = RecordingOsm::new(ChangesetId(11), NodeId(22));
        let created = service(config(), &osm)
            .create_defibrillator(BODY)
            .await
            .unwrap();

        let calls = osm.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls[0],
            OsmCall::Connect {
                api_url: "https://osm.example.org".to_string(),
                username: "mapper".to_string(),
            }
        );
        match &calls[1] {
            OsmCall::CreateChangeset(tags) => {
                assert_eq!(tags["created_by"], "mapper");
                assert_eq!(tags["comment"], "Create new AED.");
            }
            other => panic!("expected changeset creation, got {other:?}"),
        }
        match &calls[2] {
            OsmCall::CreateNode { changeset, node } => {
                assert_eq!(*changeset, ChangesetId(11));
                assert_eq!(node.changeset, Some(ChangesetId(11)));
                assert_eq!(node.tags["access"], "yes");
                assert_eq!(node.tags["indoor"], "no");
                assert_eq!(node.lat, 47.3769);
            }
            other => panic!("expected node creation, got {other:?}"),
        }
        assert_eq!(calls[3], OsmCall::CloseChangeset(ChangesetId(11)));
        assert_eq!(calls[4], OsmCall::GetNode(NodeId(22)));

        // The fetched node is returned, not the one built locally.
        assert_eq!(created, osm.fetched_node());
        assert_eq!(created.version, Some(1));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let osm = RecordingOsm::new(ChangesetId(1), NodeId(1));
        let err = service(config(), &osm)
            .create_defibrillator("")
            .await
            .unwrap_err();
        assert!(matches!(err, DefikarteError::EmptyBody));
        assert_eq!(err.kind(), ErrorKind::ClientInput);
        assert!(osm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let osm = RecordingOsm::new(ChangesetId(1), NodeId(1));
        let err = service(config(), &osm)
            .create_defibrillator("{\"latitude\": ")
            .await
            .unwrap_err();
        assert!(matches!(err, DefikarteError::MalformedPayload(_)));
        assert_eq!(err.kind(), ErrorKind::ClientInput);
        assert!(osm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_configuration() {
        let osm = RecordingOsm::new(ChangesetId(1), NodeId(1));
        let config = Config::builder()
            .osm_api_url("https://osm.example.org")
            .osm_username("mapper")
            .build();
        let err = service(config, &osm)
            .create_defibrillator(BODY)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(osm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_node_failure_leaves_changeset_open() {
        let osm = RecordingOsm::new(ChangesetId(5), NodeId(6)).failing(Failure::CreateNode);
        let err = service(config(), &osm)
            .create_defibrillator(BODY)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);

        let calls = osm.calls();
        assert_eq!(calls.len(), 3);
        assert!(!calls
            .iter()
            .any(|call| matches!(call, OsmCall::CloseChangeset(_))));
    }

    #[tokio::test]
    async fn test_changeset_failure_stops_sequence() {
        let osm = RecordingOsm::new(ChangesetId(5), NodeId(6)).failing(Failure::CreateChangeset);
        let err = service(config(), &osm)
            .create_defibrillator(BODY)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
        assert_eq!(osm.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_all_defibrillators_returns_source_result() {
        let elements: Vec<OverpassElement> = serde_json::from_str(
            r#"[{"type": "node", "id": 1, "lat": 47.0, "lon": 8.0, "tags": {"emergency": "defibrillator"}}]"#,
        )
        .unwrap();
        let overpass = StubOverpass::with_elements(elements.clone());
        let service = DefibrillatorService::with_connectors(
            config(),
            Arc::new(overpass.clone()),
            Arc::new(RecordingOsm::new(ChangesetId(1), NodeId(1))),
        );

        let result = service.all_defibrillators().await.unwrap();
        assert_eq!(result, elements);
        assert_eq!(
            overpass.connected_urls(),
            vec!["https://overpass.example.org/api".to_string()]
        );
    }

    #[tokio::test]
    async fn test_all_defibrillators_failure() {
        let service = DefibrillatorService::with_connectors(
            config(),
            Arc::new(StubOverpass::failing("Gateway Timeout")),
            Arc::new(RecordingOsm::new(ChangesetId(1), NodeId(1))),
        );

        let err = service.all_defibrillators().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("Gateway Timeout"));
    }
}
