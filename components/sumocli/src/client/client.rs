//! Sumo Logic API client
//!
//! A thin authenticated wrapper over the Sumo Logic REST API. Every request carries
//! basic authentication plus JSON `content-type`/`accept` headers, and every call
//! that comes back with anything other than `200 OK` is turned into
//! [`SumoApiError::Http`] with the response body as its reason.
//!
//! ```text
//! SumoApiClient::new(id, key, region)
//!     -> get / post / put / delete        (HTTP verbs, base + path)
//!     -> get_collectors / get_collector   (collector lookups)
//!     -> get_sources / get_source         (source lookups under a collector)
//!     -> delete_source                    (destructive call)
//! ```

// Local crates
use crate::client::errors::SumoApiError;

// External crates
use reqwest::{
    Client, Method, Response, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::instrument;

/// Query parameters passed through to a request
pub type Params<'a> = &'a [(&'a str, &'a str)];

/// Build the API base URL for a deployment, i.e, `us2` -> `https://api.us2.sumologic.com/api`
pub fn api_base_url(region: &str) -> String {
    format!("https://api.{region}.sumologic.com/api")
}

/// Authenticated Sumo Logic API session. Owns a single HTTP client (and its cookie
/// store) for the lifetime of the process.
pub struct SumoApiClient {
    http: Client,
    apipoint: String,
    access_id: String,
    access_key: String,
}

impl fmt::Debug for SumoApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SumoApiClient")
            .field("apipoint", &self.apipoint)
            .field("access_id", &self.access_id)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

impl SumoApiClient {
    /// Create a client for the given deployment region
    #[instrument(
        name = "sumo_api_client::create",
        target = "client::client::SumoApiClient",
        skip(access_key),
        level = "debug"
    )]
    pub fn new(access_id: &str, access_key: &str, region: &str) -> Result<Self, SumoApiError> {
        Self::with_base_url(access_id, access_key, &api_base_url(region))
    }

    /// Create a client against an explicit API base URL (no trailing slash)
    pub fn with_base_url(
        access_id: &str,
        access_key: &str,
        base_url: &str,
    ) -> Result<Self, SumoApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(SumoApiError::Build)?;

        tracing::debug!(apipoint = %base_url, "Sumo Logic API session created");

        Ok(Self {
            http,
            apipoint: base_url.trim_end_matches('/').to_string(),
            access_id: access_id.to_string(),
            access_key: access_key.to_string(),
        })
    }

    /// API base URL every path is appended to
    pub fn apipoint(&self) -> &str {
        &self.apipoint
    }

    //
    // ------------------------ HTTP verbs ------------------------------
    //

    /// Sumo Logic GET operation
    #[instrument(
        name = "sumo_api_client::get",
        target = "client::client::SumoApiClient",
        skip(self, params, headers),
        level = "debug"
    )]
    pub async fn get(
        &self,
        path: &str,
        params: Option<Params<'_>>,
        headers: Option<HeaderMap>,
    ) -> Result<Response, SumoApiError> {
        self.execute(Method::GET, path, params, headers, None).await
    }

    /// Sumo Logic POST operation, `data` is sent JSON-encoded
    #[instrument(
        name = "sumo_api_client::post",
        target = "client::client::SumoApiClient",
        skip(self, data, headers, params),
        level = "debug"
    )]
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &T,
        headers: Option<HeaderMap>,
        params: Option<Params<'_>>,
    ) -> Result<Response, SumoApiError> {
        let body = self.encode(path, data)?;
        self.execute(Method::POST, path, params, headers, Some(body)).await
    }

    /// Sumo Logic PUT operation, `data` is sent JSON-encoded
    #[instrument(
        name = "sumo_api_client::put",
        target = "client::client::SumoApiClient",
        skip(self, data, headers, params),
        level = "debug"
    )]
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &T,
        headers: Option<HeaderMap>,
        params: Option<Params<'_>>,
    ) -> Result<Response, SumoApiError> {
        let body = self.encode(path, data)?;
        self.execute(Method::PUT, path, params, headers, Some(body)).await
    }

    /// Sumo Logic DELETE operation, `data` is sent as-is when given
    #[instrument(
        name = "sumo_api_client::delete",
        target = "client::client::SumoApiClient",
        skip(self, params, headers, data),
        level = "debug"
    )]
    pub async fn delete(
        &self,
        path: &str,
        params: Option<Params<'_>>,
        headers: Option<HeaderMap>,
        data: Option<String>,
    ) -> Result<Response, SumoApiError> {
        self.execute(Method::DELETE, path, params, headers, data).await
    }

    //
    // ------------------------ Domain operations ------------------------------
    //

    /// Retrieve all collectors
    #[instrument(
        name = "sumo_api_client::get_collectors",
        target = "client::client::SumoApiClient",
        skip_all,
        level = "debug"
    )]
    pub async fn get_collectors(&self) -> Result<Vec<Value>, SumoApiError> {
        let url = "/v1/collectors".to_string();
        let body = self.get_json(&url).await?;
        self.take_list(&url, body, "collectors")
    }

    /// Retrieve a single collector
    #[instrument(
        name = "sumo_api_client::get_collector",
        target = "client::client::SumoApiClient",
        skip_all,
        fields(collector_id = %myself_id),
        level = "debug"
    )]
    pub async fn get_collector(
        &self,
        myself_id: impl fmt::Display,
    ) -> Result<Value, SumoApiError> {
        let url = format!("/v1/collectors/{myself_id}");
        let body = self.get_json(&url).await?;
        self.take_key(&url, body, "collector")
    }

    /// Retrieve all sources of a given collector
    #[instrument(
        name = "sumo_api_client::get_sources",
        target = "client::client::SumoApiClient",
        skip_all,
        fields(parent_id = %parent_id),
        level = "debug"
    )]
    pub async fn get_sources(
        &self,
        parent_id: impl fmt::Display,
    ) -> Result<Vec<Value>, SumoApiError> {
        let url = format!("/v1/collectors/{parent_id}/sources");
        let body = self.get_json(&url).await?;
        self.take_list(&url, body, "sources")
    }

    /// Retrieve a given source of a given collector.
    ///
    /// The single-source endpoint answers with a `source` object, but this reads the
    /// plural `sources` key exactly like [`Self::get_sources`] does.
    // TODO: switch to the `source` key once callers relying on the plural shape are audited
    #[instrument(
        name = "sumo_api_client::get_source",
        target = "client::client::SumoApiClient",
        skip_all,
        fields(parent_id = %parent_id, source_id = %myself_id),
        level = "debug"
    )]
    pub async fn get_source(
        &self,
        parent_id: impl fmt::Display,
        myself_id: impl fmt::Display,
    ) -> Result<Value, SumoApiError> {
        let url = format!("/v1/collectors/{parent_id}/sources/{myself_id}");
        let body = self.get_json(&url).await?;
        self.take_key(&url, body, "sources")
    }

    /// Delete a source from a collector, returning the raw response
    #[instrument(
        name = "sumo_api_client::delete_source",
        target = "client::client::SumoApiClient",
        skip_all,
        fields(parent_id = %parent_id, source_id = %myself_id),
        level = "debug"
    )]
    pub async fn delete_source(
        &self,
        parent_id: impl fmt::Display,
        myself_id: impl fmt::Display,
    ) -> Result<Response, SumoApiError> {
        let url = format!("/v1/collectors/{parent_id}/sources/{myself_id}");
        let response = self.delete(&url, None, None, None).await?;
        tracing::info!(path = %url, status = %response.status(), "Source deleted");
        Ok(response)
    }

    //
    // ------------------------ Internals ------------------------------
    //

    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: Option<Params<'_>>,
        headers: Option<HeaderMap>,
        body: Option<String>,
    ) -> Result<Response, SumoApiError> {
        let url = format!("{}{}", self.apipoint, path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .basic_auth(&self.access_id, Some(&self.access_key));
        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(headers) = headers {
            request = request.headers(headers);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        tracing::debug!(method = %method, url = %url, "Sending Sumo Logic API request");
        let response = request
            .send()
            .await
            .map_err(|source| SumoApiError::Transport {
                method: method.clone(),
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            // The body is the only useful reason the API gives for a rejection
            let reason = match response.text().await {
                Ok(reason) => reason,
                Err(source) => {
                    tracing::error!(
                        method = %method,
                        url = %url,
                        status = %status,
                        error = %source,
                        "Failed to read rejected Sumo Logic API response body"
                    );
                    return Err(SumoApiError::Transport {
                        method,
                        url,
                        source,
                    });
                }
            };
            tracing::error!(
                method = %method,
                url = %url,
                status = %status,
                reason = %reason,
                "Sumo Logic API request rejected"
            );
            return Err(SumoApiError::Http {
                method,
                url,
                status,
                reason,
            });
        }

        tracing::debug!(
            method = %method,
            url = %url,
            status = %status,
            "Sumo Logic API request succeeded"
        );
        Ok(response)
    }

    async fn get_json(&self, path: &str) -> Result<Value, SumoApiError> {
        let response = self.get(path, None, None).await?;
        let url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|source| SumoApiError::Transport {
                method: Method::GET,
                url: url.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| SumoApiError::Decode { url, source })
    }

    fn encode<T: Serialize + ?Sized>(
        &self,
        path: &str,
        data: &T,
    ) -> Result<String, SumoApiError> {
        serde_json::to_string(data).map_err(|source| SumoApiError::Encode {
            url: format!("{}{}", self.apipoint, path),
            source,
        })
    }

    fn take_key(
        &self,
        path: &str,
        mut body: Value,
        key: &'static str,
    ) -> Result<Value, SumoApiError> {
        match body.get_mut(key) {
            Some(value) => Ok(value.take()),
            None => Err(SumoApiError::MissingKey {
                url: format!("{}{}", self.apipoint, path),
                key,
            }),
        }
    }

    fn take_list(
        &self,
        path: &str,
        body: Value,
        key: &'static str,
    ) -> Result<Vec<Value>, SumoApiError> {
        let value = self.take_key(path, body, key)?;
        serde_json::from_value(value).map_err(|source| SumoApiError::Decode {
            url: format!("{}{}", self.apipoint, path),
            source,
        })
    }
}
