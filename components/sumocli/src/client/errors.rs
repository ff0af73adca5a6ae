// External crates
use reqwest::{Method, StatusCode};

/// Sumo Logic API client error handling
/// - `Http` carries the status and the response body as its reason, so the vendor's
/// own error message reaches the operator unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SumoApiError {
    /// The underlying HTTP client could not be configured
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never completed, or its response body could not be read
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// HTTP verb of the failed call
        method: Method,
        /// Full request URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with something other than `200 OK`
    #[error("{method} {url} returned {status}: {reason}")]
    Http {
        /// HTTP verb of the rejected call
        method: Method,
        /// Full request URL
        url: String,
        /// Status the API answered with
        status: StatusCode,
        /// Response body text
        reason: String,
    },

    /// A POST/PUT payload could not be JSON-encoded
    #[error("failed to encode request body for {url}: {source}")]
    Encode {
        /// Full request URL
        url: String,
        /// Serializer error
        #[source]
        source: serde_json::Error,
    },

    /// A response body was not the JSON shape expected
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Full request URL
        url: String,
        /// Deserializer error
        #[source]
        source: serde_json::Error,
    },

    /// A response body lacked the top-level key holding the result
    #[error("response from {url} has no `{key}` field")]
    MissingKey {
        /// Full request URL
        url: String,
        /// Key that was looked up
        key: &'static str,
    },
}

impl SumoApiError {
    /// HTTP status of a rejected call, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
