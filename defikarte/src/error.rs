//! Error types for the Defikarte library.

use thiserror::Error;

/// Errors that can occur while querying or editing defibrillator data.
#[derive(Error, Debug)]
pub enum DefikarteError {
    /// The submitted request body was empty.
    #[error("body is null or empty. please provide a valid DefibrillatorRequest object.")]
    EmptyBody,

    /// The submitted request body could not be parsed.
    #[error("{0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A required configuration value is missing or empty.
    #[error("No valid configuration available for {key}")]
    MissingConfiguration { key: &'static str },

    /// The remote service answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered with something we could not interpret.
    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// A configured base address is not a valid URL.
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// An OSM XML document could not be written.
    #[error("Failed to encode OSM document: {message}")]
    Encode { message: String },
}

/// Coarse classification of a [`DefikarteError`].
///
/// The HTTP layer maps these to status codes; nothing else should need to
/// look at individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent an empty or malformed payload.
    ClientInput,
    /// The server is missing required configuration.
    Configuration,
    /// The query or editing service failed.
    Upstream,
}

impl DefikarteError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DefikarteError::EmptyBody | DefikarteError::MalformedPayload(_) => {
                ErrorKind::ClientInput
            }
            DefikarteError::MissingConfiguration { .. } => ErrorKind::Configuration,
            DefikarteError::Http { .. }
            | DefikarteError::Network { .. }
            | DefikarteError::InvalidResponse { .. }
            | DefikarteError::InvalidUrl { .. }
            | DefikarteError::Encode { .. } => ErrorKind::Upstream,
        }
    }

    /// Convert a transport error, keeping the status code when there is one.
    pub(crate) fn from_reqwest(error: reqwest::Error, url: &str) -> Self {
        match error.status() {
            Some(status) => DefikarteError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            },
            None => DefikarteError::Network {
                url: url.to_string(),
                source: error,
            },
        }
    }
}

/// Result type alias using [`DefikarteError`].
pub type Result<T> = std::result::Result<T, DefikarteError>;
