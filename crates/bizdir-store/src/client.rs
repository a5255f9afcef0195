//! HTTP client for the object store's REST API.
//!
//! Wraps `reqwest` with the store's authentication headers, JSON error
//! envelope, and transient-error retry. Higher-level helpers
//! ([`crate::BusinessStore`], [`crate::ReviewStore`]) build on the generic
//! find/get/create/update/delete operations here.

use std::time::Duration;

use bizdir_core::{AppConfig, RemoteCredentials};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::StoreError;
use crate::object::StoreObject;
use crate::query::Query;
use crate::retry::retry_with_backoff;

const APP_ID_HEADER: &str = "x-parse-application-id";
const REST_KEY_HEADER: &str = "x-parse-rest-api-key";

/// Identity of a freshly created object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedObject {
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

/// A file accepted by the store's file endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub url: String,
}

impl StoredFile {
    /// The value to store in a file-typed object field.
    #[must_use]
    pub fn as_field(&self) -> Value {
        json!({"__type": "File", "name": self.name, "url": self.url})
    }
}

#[derive(Deserialize)]
struct FindResponse {
    results: Vec<StoreObject>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<i64>,
    error: Option<String>,
}

#[derive(Clone, Copy)]
enum Payload<'a> {
    Empty,
    Json(&'a Value),
    Bytes {
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// Client for a Parse-compatible REST API.
///
/// Use [`StoreClient::from_config`] in the binary or [`StoreClient::new`] to
/// point at a mock server in tests.
pub struct StoreClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl StoreClient {
    /// Creates a client with no retries.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`StoreError::InvalidCredentials`] if a key is not a valid header value.
    /// - [`StoreError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        credentials: &RemoteCredentials,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(APP_ID_HEADER, header_value(&credentials.app_id, "app id")?);
        headers.insert(
            REST_KEY_HEADER,
            header_value(&credentials.rest_key, "REST key")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        // Exactly one trailing slash, so joined paths land under the mount
        // point (e.g. `/parse/`) instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| StoreError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Builds a client from application config, or `None` when the store
    /// credentials are not configured.
    ///
    /// # Errors
    ///
    /// Same as [`StoreClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, StoreError> {
        let Some(credentials) = config.remote_credentials() else {
            return Ok(None);
        };
        let client = Self::new(
            &config.parse_server_url,
            &credentials,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retry(config.max_retries, config.retry_backoff_base_ms);
        Ok(Some(client))
    }

    /// Sets the transient-error retry policy.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs `query` against `class`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Api`] on a non-2xx response.
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Deserialize`] if the body is not a `results` envelope.
    pub async fn find(&self, class: &str, query: &Query) -> Result<Vec<StoreObject>, StoreError> {
        let mut url = self.endpoint(&["classes", class])?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.params() {
                pairs.append_pair(key, &value);
            }
        }
        let body = self.send(Method::GET, url, Payload::Empty).await?;
        let envelope: FindResponse = decode(body, format!("find {class}"))?;
        Ok(envelope.results)
    }

    /// Fetches one object by id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::MissingId`] if `id` is blank.
    /// - [`StoreError::Api`] with code 101 when the object does not exist.
    /// - [`StoreError::Http`] / [`StoreError::Deserialize`] as for [`Self::find`].
    pub async fn get(&self, class: &str, id: &str) -> Result<StoreObject, StoreError> {
        let id = require_id(id)?;
        let url = self.endpoint(&["classes", class, id])?;
        let body = self.send(Method::GET, url, Payload::Empty).await?;
        decode(body, format!("get {class}/{id}"))
    }

    /// Creates an object from `fields`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Api`] if the store rejects the write (see
    /// [`StoreError::is_permission_denied`]), otherwise as for [`Self::find`].
    pub async fn create(
        &self,
        class: &str,
        fields: &Map<String, Value>,
    ) -> Result<CreatedObject, StoreError> {
        let url = self.endpoint(&["classes", class])?;
        let body = Value::Object(fields.clone());
        let response = self.send(Method::POST, url, Payload::Json(&body)).await?;
        decode(response, format!("create {class}"))
    }

    /// Sets `fields` on an existing object.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingId`] if `id` is blank, otherwise as for [`Self::create`].
    pub async fn update(
        &self,
        class: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let id = require_id(id)?;
        let url = self.endpoint(&["classes", class, id])?;
        let body = Value::Object(fields.clone());
        self.send(Method::PUT, url, Payload::Json(&body)).await?;
        Ok(())
    }

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingId`] if `id` is blank, otherwise as for [`Self::create`].
    pub async fn delete(&self, class: &str, id: &str) -> Result<(), StoreError> {
        let id = require_id(id)?;
        let url = self.endpoint(&["classes", class, id])?;
        self.send(Method::DELETE, url, Payload::Empty).await?;
        Ok(())
    }

    /// Uploads raw bytes to the store's file endpoint.
    ///
    /// # Errors
    ///
    /// As for [`Self::create`].
    pub async fn upload_file(
        &self,
        name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<StoredFile, StoreError> {
        let url = self.endpoint(&["files", name])?;
        let response = self
            .send(Method::POST, url, Payload::Bytes { content_type, data })
            .await?;
        decode(response, format!("upload file {name}"))
    }

    /// Appends path segments (percent-encoded) to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| StoreError::InvalidBaseUrl {
                    url: self.base_url.to_string(),
                    reason: "URL cannot be used as a base".to_owned(),
                })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Sends one request with retry, asserts a 2xx status, and parses the
    /// body as JSON. An empty body parses as `null`.
    async fn send(
        &self,
        method: Method,
        url: Url,
        payload: Payload<'_>,
    ) -> Result<Value, StoreError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            let url = url.clone();
            async move {
                tracing::debug!(%method, path = url.path(), "object store request");
                let request = self.client.request(method.clone(), url.clone());
                let request = match payload {
                    Payload::Empty => request,
                    Payload::Json(body) => request.json(body),
                    Payload::Bytes { content_type, data } => {
                        request.header(CONTENT_TYPE, content_type).body(data.to_vec())
                    }
                };

                let response = request.send().await?;
                let status = response.status();
                let body = response.text().await?;
                if !status.is_success() {
                    return Err(api_error(status, &body));
                }
                if body.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
                    context: format!("{method} {}", url.path()),
                    source: e,
                })
            }
        })
        .await
    }
}

fn header_value(value: &str, what: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value).map_err(|e| StoreError::InvalidCredentials(format!("{what}: {e}")))
}

fn require_id(id: &str) -> Result<&str, StoreError> {
    let id = id.trim();
    if id.is_empty() {
        Err(StoreError::MissingId)
    } else {
        Ok(id)
    }
}

fn decode<T: DeserializeOwned>(value: Value, context: String) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Deserialize { context, source: e })
}

/// Maps a non-2xx response onto [`StoreError::Api`], reading the store's
/// `{"code": n, "error": "..."}` envelope when the body has one.
fn api_error(status: StatusCode, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<ErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code);
    let message = parsed
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            } else {
                trimmed.to_owned()
            }
        });
    StoreError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
