//! Request payloads and OSM element types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag mapping of an OSM element. Keys are unique.
pub type Tags = BTreeMap<String, String>;

/// Identifier of an OSM node, assigned by the OSM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an OSM changeset, assigned by the OSM API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangesetId(pub u64);

impl fmt::Display for ChangesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Payload submitted by clients to register a new defibrillator.
///
/// Coordinates are required. Text fields default to an empty string and
/// flags to `false`; empty values are still written as tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefibrillatorRequest {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Emergency number to call at this location.
    #[serde(default)]
    pub emergency_phone: String,
    /// Free-text description of where the device hangs.
    #[serde(default)]
    pub location: String,
    /// Opening hours in OSM `opening_hours` syntax.
    #[serde(default)]
    pub opening_hours: String,
    /// Phone number of the operator.
    #[serde(default)]
    pub operator_phone: String,
    /// Name of the operator.
    #[serde(default, alias = "operator")]
    pub operator_name: String,
    /// Whether the device is publicly accessible.
    #[serde(default)]
    pub accessible: bool,
    /// Whether the device is located indoors.
    #[serde(default)]
    pub indoor: bool,
}

/// An OSM node.
///
/// Locally built nodes only carry coordinates, tags and the changeset; nodes
/// fetched from the OSM API also carry the server-managed metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoNode {
    /// Node id, absent until the node has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Tags attached to the node.
    #[serde(default)]
    pub tags: Tags,
    /// Changeset that created or last modified the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changeset: Option<ChangesetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

/// An OSM changeset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Changeset {
    /// Changeset id, absent until the changeset has been opened.
    pub id: Option<ChangesetId>,
    /// Descriptive tags (`created_by`, `comment`, ...).
    pub tags: Tags,
}

/// Comment attached to every changeset that adds a defibrillator.
pub const CREATE_AED_COMMENT: &str = "Create new AED.";

impl Changeset {
    /// Changeset for adding a new AED on behalf of `username`.
    pub fn create_aed(username: &str) -> Self {
        let tags = Tags::from([
            ("created_by".to_string(), username.to_string()),
            ("comment".to_string(), CREATE_AED_COMMENT.to_string()),
        ]);
        Self { id: None, tags }
    }
}
