// Seal service client: a small blocking HTTP client that registers a
// document digest with the notarization API and returns the retrieval id
// the service assigns to it.
//
// One request per call. There is no retry; the caller decides what a
// failure means for the rest of the run.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::{Config, ConfigError};
use crate::digest::Digest;
use crate::error::SealError;

/// Protocol version sent with every registration.
pub const API_VERSION: u32 = 6;

const API_KEY_HEADER: &str = "X-API-Key";

/// Blocking client bound to one endpoint and one API key.
#[derive(Clone)]
pub struct SealClient {
    client: Client,
    seal_url: Url,
    headers: HeaderMap,
}

/// JSON envelope returned by a successful registration.
///
/// Missing version fields read as 0. A missing or `null` document list
/// reads as empty and becomes `NoDocuments`, not a decode error.
#[derive(Deserialize, Debug)]
pub struct RegisterResponse {
    #[serde(rename = "maxSupportedAPIVersion", default)]
    pub max_supported_api_version: u32,
    #[serde(rename = "minSupportedAPIVersion", default)]
    pub min_supported_api_version: u32,
    #[serde(default)]
    pub documents: Option<Vec<SealedDocument>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SealedDocument {
    pub retrieval_id: String,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub retrieval_id: String,
    pub min_api_version: u32,
    pub max_api_version: u32,
}

impl SealClient {
    /// Build a client for the endpoint and key in `config`, with the
    /// configured request timeout applied to the whole exchange.
    pub fn new(config: &Config) -> Result<Self, SealError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SealError::ClientBuild)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key =
            HeaderValue::from_str(&config.api_key).map_err(|_| ConfigError::InvalidApiKey)?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        Ok(SealClient {
            client,
            seal_url: config.seal_url.clone(),
            headers,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.seal_url
    }

    /// Register `digest` and return the first document's retrieval id.
    ///
    /// Only HTTP 200 counts as success; any other status is returned as
    /// `SealError::Status` without reading the body. A blank retrieval id
    /// is a failure too: there would be nothing to log.
    pub fn register(&self, digest: &Digest) -> Result<Registration, SealError> {
        let version = API_VERSION.to_string();
        let hashes = digest.to_hex();
        let form = [("version", version.as_str()), ("hashes", hashes.as_str())];

        tracing::debug!(endpoint = %self.seal_url, digest = %hashes, "sending registration");

        let res = self
            .client
            .post(self.seal_url.clone())
            .headers(self.headers.clone())
            .form(&form)
            .send()
            .map_err(|source| SealError::Transport {
                endpoint: self.seal_url.to_string(),
                source,
            })?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(SealError::Status {
                status: status.as_u16(),
            });
        }

        let body = res.text().map_err(|source| SealError::Transport {
            endpoint: self.seal_url.to_string(),
            source,
        })?;
        let parsed: RegisterResponse =
            serde_json::from_str(&body).map_err(|e| SealError::Decode(e.to_string()))?;

        let advertised = parsed.min_supported_api_version..=parsed.max_supported_api_version;
        if parsed.max_supported_api_version != 0 && !advertised.contains(&API_VERSION) {
            tracing::warn!(
                sent = API_VERSION,
                min = parsed.min_supported_api_version,
                max = parsed.max_supported_api_version,
                "seal service does not advertise support for our API version"
            );
        }

        let first = parsed
            .documents
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or(SealError::NoDocuments)?;

        if first.retrieval_id.trim().is_empty() {
            return Err(SealError::EmptyRetrievalId);
        }

        Ok(Registration {
            retrieval_id: first.retrieval_id,
            min_api_version: parsed.min_supported_api_version,
            max_api_version: parsed.max_supported_api_version,
        })
    }
}
