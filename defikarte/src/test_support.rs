//! In-memory connectors for tests.
//!
//! [`RecordingOsm`] records every call made against the OSM API and can be
//! told to fail at a given step; [`StubOverpass`] serves a fixed result set.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Region;
use crate::error::{DefikarteError, Result};
use crate::model::{Changeset, ChangesetId, GeoNode, NodeId, Tags};
use crate::osm::{OsmConnector, OsmEditor};
use crate::overpass::{DefibrillatorSource, OverpassConnector, OverpassElement};

/// A call received by [`RecordingOsm`].
#[derive(Debug, Clone, PartialEq)]
pub enum OsmCall {
    Connect { api_url: String, username: String },
    CreateChangeset(Tags),
    CreateNode { changeset: ChangesetId, node: GeoNode },
    CloseChangeset(ChangesetId),
    GetNode(NodeId),
}

/// Step at which [`RecordingOsm`] answers with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    CreateChangeset,
    CreateNode,
    CloseChangeset,
    GetNode,
}

/// Stub OSM API recording the calls it receives.
///
/// Clones share the same call log.
#[derive(Debug, Clone)]
pub struct RecordingOsm {
    calls: Arc<Mutex<Vec<OsmCall>>>,
    changeset_id: ChangesetId,
    node_id: NodeId,
    failure: Option<Failure>,
}

impl RecordingOsm {
    /// Stub assigning `changeset_id` and `node_id` to the created objects.
    pub fn new(changeset_id: ChangesetId, node_id: NodeId) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            changeset_id,
            node_id,
            failure: None,
        }
    }

    /// Fail with an HTTP error at `failure`.
    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<OsmCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// The node served by `get_node`, as the OSM API would normalise it.
    pub fn fetched_node(&self) -> GeoNode {
        let created = self.calls().into_iter().find_map(|call| match call {
            OsmCall::CreateNode { node, .. } => Some(node),
            _ => None,
        });
        let created = created.unwrap_or_default();

        GeoNode {
            id: Some(self.node_id),
            changeset: Some(self.changeset_id),
            version: Some(1),
            timestamp: Some("2024-01-01T00:00:00Z".to_string()),
            user: Some("mapper".to_string()),
            uid: Some(1),
            visible: None,
            ..created
        }
    }

    fn record(&self, call: OsmCall) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    fn check(&self, step: Failure, path: &str) -> Result<()> {
        if self.failure == Some(step) {
            return Err(DefikarteError::Http {
                url: format!("https://osm.example.org/api/0.6/{path}"),
                status: 401,
                message: "Couldn't authenticate you".to_string(),
            });
        }
        Ok(())
    }
}

impl OsmConnector for RecordingOsm {
    fn basic_auth(
        &self,
        api_url: &str,
        username: &str,
        _password: &str,
    ) -> Result<Box<dyn OsmEditor>> {
        self.record(OsmCall::Connect {
            api_url: api_url.to_string(),
            username: username.to_string(),
        });
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl OsmEditor for RecordingOsm {
    async fn create_changeset(&self, changeset: &Changeset) -> Result<ChangesetId> {
        self.record(OsmCall::CreateChangeset(changeset.tags.clone()));
        self.check(Failure::CreateChangeset, "changeset/create")?;
        Ok(self.changeset_id)
    }

    async fn create_node(&self, changeset: ChangesetId, node: &GeoNode) -> Result<NodeId> {
        self.record(OsmCall::CreateNode {
            changeset,
            node: node.clone(),
        });
        self.check(Failure::CreateNode, "node/create")?;
        Ok(self.node_id)
    }

    async fn close_changeset(&self, changeset: ChangesetId) -> Result<()> {
        self.record(OsmCall::CloseChangeset(changeset));
        self.check(Failure::CloseChangeset, &format!("changeset/{changeset}/close"))
    }

    async fn get_node(&self, id: NodeId) -> Result<GeoNode> {
        self.record(OsmCall::GetNode(id));
        self.check(Failure::GetNode, &format!("node/{id}.json"))?;
        Ok(self.fetched_node())
    }
}

/// Stub Overpass instance serving a fixed answer.
#[derive(Debug, Clone)]
pub struct StubOverpass {
    answer: std::result::Result<Vec<OverpassElement>, String>,
    connected: Arc<Mutex<Vec<String>>>,
}

impl StubOverpass {
    /// Stub serving no elements.
    pub fn empty() -> Self {
        Self::with_elements(Vec::new())
    }

    /// Stub serving `elements`.
    pub fn with_elements(elements: Vec<OverpassElement>) -> Self {
        Self {
            answer: Ok(elements),
            connected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stub failing every query with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            connected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Base addresses clients were created for.
    pub fn connected_urls(&self) -> Vec<String> {
        self.connected.lock().expect("connection log poisoned").clone()
    }
}

impl OverpassConnector for StubOverpass {
    fn connect(&self, base_url: &str) -> Result<Box<dyn DefibrillatorSource>> {
        self.connected
            .lock()
            .expect("connection log poisoned")
            .push(base_url.to_string());
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl DefibrillatorSource for StubOverpass {
    async fn all_defibrillators(&self, _region: &Region) -> Result<Vec<OverpassElement>> {
        self.answer
            .clone()
            .map_err(|message| DefikarteError::Http {
                url: "https://overpass.example.org/api/interpreter".to_string(),
                status: 504,
                message,
            })
    }
}
