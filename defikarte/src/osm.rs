//! OSM editing API (v0.6) client.
//!
//! Edits go through changesets: a changeset is opened, elements are created
//! inside it, and the changeset is closed. Writes are XML documents, reads
//! use the JSON representation of the API.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::error::{DefikarteError, Result};
use crate::model::{Changeset, ChangesetId, GeoNode, NodeId, Tags};
use crate::USER_AGENT_VALUE;

/// Path of the API below the server address.
const API_PREFIX: &str = "api/0.6";

/// Authenticated write access to the OSM database.
#[async_trait]
pub trait OsmEditor: Send + Sync {
    /// Open a changeset carrying the given tags.
    async fn create_changeset(&self, changeset: &Changeset) -> Result<ChangesetId>;
    /// Create `node` inside the open changeset `changeset`.
    async fn create_node(&self, changeset: ChangesetId, node: &GeoNode) -> Result<NodeId>;
    /// Close a changeset, making its edits final.
    async fn close_changeset(&self, changeset: ChangesetId) -> Result<()>;
    /// Fetch the current version of a node.
    async fn get_node(&self, id: NodeId) -> Result<GeoNode>;
}

/// Creates [`OsmEditor`]s for a given server and account.
pub trait OsmConnector: Send + Sync {
    /// Create a client authenticating with HTTP basic credentials.
    fn basic_auth(
        &self,
        api_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn OsmEditor>>;
}

#[derive(Serialize)]
#[serde(rename = "osm")]
struct ChangesetDocument<'a> {
    changeset: ChangesetElement<'a>,
}

#[derive(Serialize)]
struct ChangesetElement<'a> {
    #[serde(rename = "tag")]
    tags: Vec<TagElement<'a>>,
}

#[derive(Serialize)]
#[serde(rename = "osm")]
struct NodeDocument<'a> {
    node: NodeElement<'a>,
}

#[derive(Serialize)]
struct NodeElement<'a> {
    #[serde(rename = "@changeset")]
    changeset: u64,
    #[serde(rename = "@lat")]
    lat: f64,
    #[serde(rename = "@lon")]
    lon: f64,
    #[serde(rename = "tag")]
    tags: Vec<TagElement<'a>>,
}

#[derive(Serialize)]
struct TagElement<'a> {
    #[serde(rename = "@k")]
    k: &'a str,
    #[serde(rename = "@v")]
    v: &'a str,
}

fn tag_elements(tags: &Tags) -> Vec<TagElement<'_>> {
    tags.iter()
        .map(|(k, v)| TagElement {
            k: k.as_str(),
            v: v.as_str(),
        })
        .collect()
}

fn to_xml<T: Serialize>(document: &T) -> Result<String> {
    quick_xml::se::to_string(document).map_err(|e| DefikarteError::Encode {
        message: e.to_string(),
    })
}

/// XML body for opening `changeset`.
pub fn changeset_xml(changeset: &Changeset) -> Result<String> {
    to_xml(&ChangesetDocument {
        changeset: ChangesetElement {
            tags: tag_elements(&changeset.tags),
        },
    })
}

/// XML body for creating `node` inside `changeset`.
pub fn node_xml(changeset: ChangesetId, node: &GeoNode) -> Result<String> {
    to_xml(&NodeDocument {
        node: NodeElement {
            changeset: changeset.0,
            lat: node.lat,
            lon: node.lon,
            tags: tag_elements(&node.tags),
        },
    })
}

#[derive(Deserialize)]
struct NodeResponse {
    elements: Vec<GeoNode>,
}

/// HTTP client for the OSM API, authenticated with basic credentials.
#[derive(Clone)]
pub struct OsmApiClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl OsmApiClient {
    /// Create a client for the OSM server at `api_url`
    /// (e.g. `https://master.apis.dev.openstreetmap.org`).
    pub fn new(api_url: &str, username: &str, password: &str) -> Result<Self> {
        let base_url = format!("{}/{}", api_url.trim_end_matches('/'), API_PREFIX);
        reqwest::Url::parse(&base_url).map_err(|e| DefikarteError::InvalidUrl {
            url: api_url.to_string(),
            message: e.to_string(),
        })?;

        let client = Client::builder()
            .build()
            .map_err(|e| DefikarteError::from_reqwest(e, api_url))?;

        Ok(Self {
            client,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Full address of an API endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header(USER_AGENT, USER_AGENT_VALUE)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| DefikarteError::from_reqwest(e, url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The API explains most rejections in a plain text body.
        let message = response.text().await.unwrap_or_default();
        Err(DefikarteError::Http {
            url: url.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn put_xml(&self, path: &str, body: String) -> Result<String> {
        let url = self.endpoint(path);
        let request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body);
        let response = self.send(request, &url).await?;
        response
            .text()
            .await
            .map_err(|e| DefikarteError::from_reqwest(e, &url))
    }

    async fn put_xml_for_id(&self, path: &str, body: String) -> Result<u64> {
        let url = self.endpoint(path);
        let text = self.put_xml(path, body).await?;
        text.trim()
            .parse()
            .map_err(|_| DefikarteError::InvalidResponse {
                url,
                message: format!("expected a numeric id, got {:?}", text.trim()),
            })
    }
}

#[async_trait]
impl OsmEditor for OsmApiClient {
    async fn create_changeset(&self, changeset: &Changeset) -> Result<ChangesetId> {
        let body = changeset_xml(changeset)?;
        let id = self.put_xml_for_id("changeset/create", body).await?;
        tracing::debug!(changeset = id, "Opened changeset");
        Ok(ChangesetId(id))
    }

    async fn create_node(&self, changeset: ChangesetId, node: &GeoNode) -> Result<NodeId> {
        let body = node_xml(changeset, node)?;
        let id = self.put_xml_for_id("node/create", body).await?;
        let id = i64::try_from(id).map_err(|_| DefikarteError::InvalidResponse {
            url: self.endpoint("node/create"),
            message: format!("node id {id} out of range"),
        })?;
        tracing::debug!(changeset = changeset.0, node = id, "Created node");
        Ok(NodeId(id))
    }

    async fn close_changeset(&self, changeset: ChangesetId) -> Result<()> {
        let url = self.endpoint(&format!("changeset/{changeset}/close"));
        let request = self.client.put(&url);
        self.send(request, &url).await?;
        tracing::debug!(changeset = changeset.0, "Closed changeset");
        Ok(())
    }

    async fn get_node(&self, id: NodeId) -> Result<GeoNode> {
        let url = self.endpoint(&format!("node/{id}.json"));
        let request = self.client.get(&url);
        let response = self.send(request, &url).await?;

        let body: NodeResponse =
            response
                .json()
                .await
                .map_err(|e| DefikarteError::InvalidResponse {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

        body.elements
            .into_iter()
            .next()
            .ok_or_else(|| DefikarteError::InvalidResponse {
                url,
                message: "response contains no node".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changeset_xml() {
        let xml = changeset_xml(&Changeset::create_aed("mapper")).unwrap();
        assert_eq!(
            xml,
            r#"<osm><changeset><tag k="comment" v="Create new AED."/><tag k="created_by" v="mapper"/></changeset></osm>"#
        );
    }

    #[test]
    fn test_node_xml() {
        let node = GeoNode {
            lat: 47.5,
            lon: 8.25,
            tags: Tags::from([
                ("emergency".to_string(), "defibrillator".to_string()),
                ("indoor".to_string(), "no".to_string()),
            ]),
            ..Default::default()
        };
        let xml = node_xml(ChangesetId(42), &node).unwrap();
        assert_eq!(
            xml,
            r#"<osm><node changeset="42" lat="47.5" lon="8.25"><tag k="emergency" v="defibrillator"/><tag k="indoor" v="no"/></node></osm>"#
        );
    }

    #[test]
    fn test_xml_escapes_values() {
        let node = GeoNode {
            lat: 1.0,
            lon: 2.0,
            tags: Tags::from([(
                "defibrillator:location".to_string(),
                r#"Foyer "A" & <B>"#.to_string(),
            )]),
            ..Default::default()
        };
        let xml = node_xml(ChangesetId(1), &node).unwrap();
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&lt;B"));
        assert!(xml.contains("&quot;A&quot;"));
    }

    #[test]
    fn test_empty_tag_value_is_written() {
        let node = GeoNode {
            lat: 1.0,
            lon: 2.0,
            tags: Tags::from([("phone".to_string(), String::new())]),
            ..Default::default()
        };
        let xml = node_xml(ChangesetId(1), &node).unwrap();
        assert!(xml.contains(r#"<tag k="phone" v=""/>"#));
    }

    #[test]
    fn test_endpoint() {
        let client =
            OsmApiClient::new("https://master.apis.dev.openstreetmap.org/", "u", "p").unwrap();
        assert_eq!(
            client.endpoint("changeset/create"),
            "https://master.apis.dev.openstreetmap.org/api/0.6/changeset/create"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let result = OsmApiClient::new("::::", "u", "p");
        assert!(matches!(result, Err(DefikarteError::InvalidUrl { .. })));
    }
}
