//! Runtime configuration.
//!
//! A [`Config`] is built once at start-up, usually with
//! [`ConfigBuilder::from_env`], and handed to the [`DefibrillatorService`].
//! Missing OSM credentials do not prevent start-up; submissions fail with
//! [`DefikarteError::MissingConfiguration`] until they are set.
//!
//! [`DefibrillatorService`]: crate::DefibrillatorService

use std::fmt;

use crate::error::{DefikarteError, Result};

/// Public Overpass instance used when none is configured.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api";

/// Region served when none is configured.
pub const DEFAULT_REGION: &str = "CH";

/// Configuration key of the OSM username.
pub const OSM_USERNAME: &str = "osmUsername";
/// Configuration key of the OSM password.
pub const OSM_USER_PASSWORD: &str = "osmUserPassword";
/// Configuration key of the OSM API address.
pub const OSM_API_URL: &str = "osmApiUrl";

/// The fixed area whose defibrillators are served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    iso3166_1: String,
}

impl Region {
    /// Region identified by an ISO 3166-1 alpha-2 country code.
    pub fn new(iso3166_1: impl Into<String>) -> Self {
        Self {
            iso3166_1: iso3166_1.into().to_uppercase(),
        }
    }

    /// The ISO 3166-1 code of this region.
    pub fn iso3166_1(&self) -> &str {
        &self.iso3166_1
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

/// Validated OSM API credentials borrowed from a [`Config`].
#[derive(Clone, Copy)]
pub struct OsmCredentials<'a> {
    pub api_url: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for OsmCredentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsmCredentials")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Service configuration.
#[derive(Clone)]
pub struct Config {
    overpass_url: String,
    region: Region,
    osm_api_url: Option<String>,
    osm_username: Option<String>,
    osm_user_password: Option<String>,
}

impl Config {
    /// Start building a configuration from defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Base address of the Overpass query service.
    pub fn overpass_url(&self) -> &str {
        &self.overpass_url
    }

    /// Region whose defibrillators are queried.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Address of the OSM editing API, if configured.
    pub fn osm_api_url(&self) -> Option<&str> {
        non_empty(&self.osm_api_url)
    }

    /// OSM credentials, or the key of the first missing or empty value.
    pub fn osm_credentials(&self) -> Result<OsmCredentials<'_>> {
        let username = non_empty(&self.osm_username)
            .ok_or(DefikarteError::MissingConfiguration { key: OSM_USERNAME })?;
        let password = non_empty(&self.osm_user_password).ok_or(
            DefikarteError::MissingConfiguration {
                key: OSM_USER_PASSWORD,
            },
        )?;
        let api_url = self
            .osm_api_url()
            .ok_or(DefikarteError::MissingConfiguration { key: OSM_API_URL })?;

        Ok(OsmCredentials {
            api_url,
            username,
            password,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().build()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("overpass_url", &self.overpass_url)
            .field("region", &self.region)
            .field("osm_api_url", &self.osm_api_url)
            .field("osm_username", &self.osm_username)
            .field(
                "osm_user_password",
                &self.osm_user_password.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Builder for [`Config`].
///
/// # Example
///
/// ```ignore
/// use defikarte::Config;
///
/// let config = Config::builder()
///     .overpass_url("https://overpass.example.org/api")
///     .osm_api_url("https://master.apis.dev.openstreetmap.org")
///     .osm_username("mapper")
///     .osm_user_password("secret")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    overpass_url: String,
    region: Region,
    osm_api_url: Option<String>,
    osm_username: Option<String>,
    osm_user_password: Option<String>,
}

impl ConfigBuilder {
    /// Create a builder with the default Overpass instance and region.
    pub fn new() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            region: Region::default(),
            osm_api_url: None,
            osm_username: None,
            osm_user_password: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DEFIKARTE_OVERPASS_URL` | Overpass API base address | `https://overpass-api.de/api` |
    /// | `DEFIKARTE_REGION` | ISO 3166-1 code of the served region | `CH` |
    /// | `DEFIKARTE_OSM_API_URL` | OSM API server address | None |
    /// | `DEFIKARTE_OSM_USERNAME` | OSM account used for edits | None |
    /// | `DEFIKARTE_OSM_USER_PASSWORD` | Password of that account | None |
    pub fn from_env() -> Self {
        let mut builder = Self::new();

        if let Ok(url) = std::env::var("DEFIKARTE_OVERPASS_URL") {
            if !url.is_empty() {
                builder = builder.overpass_url(url);
            }
        }
        if let Ok(region) = std::env::var("DEFIKARTE_REGION") {
            if !region.is_empty() {
                builder = builder.region(Region::new(region));
            }
        }

        builder.osm_api_url = std::env::var("DEFIKARTE_OSM_API_URL").ok();
        builder.osm_username = std::env::var("DEFIKARTE_OSM_USERNAME").ok();
        builder.osm_user_password = std::env::var("DEFIKARTE_OSM_USER_PASSWORD").ok();
        builder
    }

    /// Set the Overpass API base address.
    pub fn overpass_url(mut self, url: impl Into<String>) -> Self {
        self.overpass_url = url.into();
        self
    }

    /// Set the served region.
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set the OSM API server address.
    pub fn osm_api_url(mut self, url: impl Into<String>) -> Self {
        self.osm_api_url = Some(url.into());
        self
    }

    /// Set the OSM username.
    pub fn osm_username(mut self, username: impl Into<String>) -> Self {
        self.osm_username = Some(username.into());
        self
    }

    /// Set the OSM password.
    pub fn osm_user_password(mut self, password: impl Into<String>) -> Self {
        self.osm_user_password = Some(password.into());
        self
    }

    /// Build the [`Config`].
    pub fn build(self) -> Config {
        Config {
            overpass_url: self.overpass_url,
            region: self.region,
            osm_api_url: self.osm_api_url,
            osm_username: self.osm_username,
            osm_user_password: self.osm_user_password,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ConfigBuilder {
        Config::builder()
            .osm_api_url("https://master.apis.dev.openstreetmap.org")
            .osm_username("mapper")
            .osm_user_password("secret")
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.overpass_url(), DEFAULT_OVERPASS_URL);
        assert_eq!(config.region().iso3166_1(), "CH");
        assert!(config.osm_api_url().is_none());
    }

    #[test]
    fn test_complete_credentials() {
        let config = complete().build();
        let credentials = config.osm_credentials().unwrap();
        assert_eq!(credentials.username, "mapper");
        assert_eq!(credentials.password, "secret");
        assert_eq!(
            credentials.api_url,
            "https://master.apis.dev.openstreetmap.org"
        );
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::builder()
            .osm_api_url("https://api.example.org")
            .osm_user_password("secret")
            .build();
        let err = config.osm_credentials().unwrap_err();
        assert!(matches!(
            err,
            DefikarteError::MissingConfiguration { key: OSM_USERNAME }
        ));

        let config = Config::builder()
            .osm_api_url("https://api.example.org")
            .osm_username("mapper")
            .build();
        let err = config.osm_credentials().unwrap_err();
        assert!(matches!(
            err,
            DefikarteError::MissingConfiguration {
                key: OSM_USER_PASSWORD
            }
        ));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let config = complete().osm_api_url("").build();
        let err = config.osm_credentials().unwrap_err();
        assert!(matches!(
            err,
            DefikarteError::MissingConfiguration { key: OSM_API_URL }
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = complete().build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("mapper"));

        let credentials = config.osm_credentials().unwrap();
        assert!(!format!("{credentials:?}").contains("secret"));
    }

    #[test]
    fn test_region_is_uppercased() {
        assert_eq!(Region::new("li").iso3166_1(), "LI");
    }

    #[test]
    fn test_from_env_with_values() {
        // Save original values
        let orig_url = std::env::var("DEFIKARTE_OVERPASS_URL").ok();
        let orig_user = std::env::var("DEFIKARTE_OSM_USERNAME").ok();

        std::env::set_var("DEFIKARTE_OVERPASS_URL", "https://overpass.example.org/api");
        std::env::set_var("DEFIKARTE_OSM_USERNAME", "env-mapper");

        let config = ConfigBuilder::from_env().build();
        assert_eq!(config.overpass_url(), "https://overpass.example.org/api");
        assert_eq!(config.osm_username.as_deref(), Some("env-mapper"));

        // Restore original values
        match orig_url {
            Some(v) => std::env::set_var("DEFIKARTE_OVERPASS_URL", v),
            None => std::env::remove_var("DEFIKARTE_OVERPASS_URL"),
        }
        match orig_user {
            Some(v) => std::env::set_var("DEFIKARTE_OSM_USERNAME", v),
            None => std::env::remove_var("DEFIKARTE_OSM_USERNAME"),
        }
    }
}
