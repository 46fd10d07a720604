/// Facebook Graph API client
///
/// Thin wrapper over a shared `reqwest::Client` that prefixes every path with
/// the configured base URL and API version, and turns Graph error envelopes
/// (`{"error": {"message": ...}}`) into [`GraphError::Api`].
///
/// The base URL is configurable so tests can point the client at a local mock
/// server.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize};

/// Production Graph API host
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Graph API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v19.0";

/// Per-request timeout for outbound calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from Graph API calls
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Transport failure or undecodable body
    #[error("Graph request failed: {0}")]
    Http(reqwest::Error),

    /// The API answered with an error envelope or a non-success status
    #[error("Graph API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The API answered successfully but a required field was missing
    #[error("Unexpected Graph response: {0}")]
    UnexpectedResponse(String),
}

// Graph GETs carry secrets and tokens in the query string
impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        GraphError::Http(err.without_url())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Versioned Graph API client
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    base_url: String,
    version: String,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Result<Self, GraphError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(http, base_url, version))
    }

    /// Builds a client around an existing `reqwest::Client`
    pub fn with_http_client(
        http: Client,
        base_url: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Absolute URL for a Graph path, e.g. `me/accounts`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            self.version,
            path.trim_start_matches('/')
        )
    }

    /// `GET {base}/{version}/{path}?{query}`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GraphError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    /// `POST {base}/{version}/{path}` with a form-encoded body
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, GraphError> {
        let response = self.http.post(self.url(path)).form(form).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GraphError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        tracing::warn!(status = status.as_u16(), error = %message, "Graph API call failed");

        Err(GraphError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
