//! Overpass query client.
//!
//! Overpass answers read-only queries against a replica of the OSM database.
//! The only query issued here fetches every node tagged
//! `emergency=defibrillator` inside the configured [`Region`].

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Region;
use crate::error::{DefikarteError, Result};
use crate::model::Tags;
use crate::USER_AGENT_VALUE;

/// Server-side time limit of the query, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// One element of an Overpass result set.
///
/// Fields not modelled here are kept in `extra` so that the element can be
/// handed back to callers unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassElement {
    /// Element type (`node`, `way`, `relation`).
    #[serde(rename = "type")]
    pub kind: String,
    /// OSM id of the element.
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of an Overpass JSON answer.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    /// Result set of the query.
    pub elements: Vec<OverpassElement>,
    /// Set by Overpass when the query hit a runtime error or limit.
    #[serde(default)]
    pub remark: Option<String>,
}

/// Read access to defibrillator locations.
#[async_trait]
pub trait DefibrillatorSource: Send + Sync {
    /// Fetch every defibrillator node inside `region`.
    async fn all_defibrillators(&self, region: &Region) -> Result<Vec<OverpassElement>>;
}

/// Creates a [`DefibrillatorSource`] bound to a base address.
pub trait OverpassConnector: Send + Sync {
    /// Create a client for the Overpass instance at `base_url`.
    fn connect(&self, base_url: &str) -> Result<Box<dyn DefibrillatorSource>>;
}

/// Build the Overpass QL query for all defibrillators in `region`.
pub fn defibrillator_query(region: &Region) -> String {
    format!(
        "[out:json][timeout:{}];\n\
         area[\"ISO3166-1\"=\"{}\"][admin_level=2]->.searchArea;\n\
         node[\"emergency\"=\"defibrillator\"](area.searchArea);\n\
         out body;",
        QUERY_TIMEOUT_SECS,
        region.iso3166_1()
    )
}

/// HTTP client for an Overpass instance.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    interpreter_url: String,
}

impl OverpassClient {
    /// Create a client for the Overpass API at `base_url`
    /// (e.g. `https://overpass-api.de/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        let interpreter_url = format!("{}/interpreter", base_url.trim_end_matches('/'));
        reqwest::Url::parse(&interpreter_url).map_err(|e| DefikarteError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let client = Client::builder()
            .build()
            .map_err(|e| DefikarteError::from_reqwest(e, base_url))?;

        Ok(Self {
            client,
            interpreter_url,
        })
    }

    /// Address queries are posted to.
    pub fn interpreter_url(&self) -> &str {
        &self.interpreter_url
    }

    /// Run an Overpass QL query and return its result set.
    pub async fn query(&self, query: &str) -> Result<Vec<OverpassElement>> {
        let url = self.interpreter_url.as_str();
        tracing::debug!(url, query, "Running Overpass query");

        let response = self
            .client
            .post(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| DefikarteError::from_reqwest(e, url))?
            .error_for_status()
            .map_err(|e| DefikarteError::from_reqwest(e, url))?;

        let body: OverpassResponse =
            response
                .json()
                .await
                .map_err(|e| DefikarteError::InvalidResponse {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        if let Some(remark) = body.remark {
            // Overpass reports runtime errors (timeouts, memory) with 200 and a remark.
            if remark.contains("error") {
                return Err(DefikarteError::InvalidResponse {
                    url: url.to_string(),
                    message: remark,
                });
            }
        }

        Ok(body.elements)
    }
}

#[async_trait]
impl DefibrillatorSource for OverpassClient {
    async fn all_defibrillators(&self, region: &Region) -> Result<Vec<OverpassElement>> {
        self.query(&defibrillator_query(region)).await
    }
}
