use std::sync::Arc;

use reqwest::{header, Client, Method, StatusCode, Url};
use rigit_config::Settings;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::endpoints::Endpoint;
use crate::error::{extract_error_message, ApiError};

/// Thin JSON client over the backend REST contract.
///
/// Cheap to clone; every clone shares the connection pool and the credential
/// store. There is no retry: every call is exactly one request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base", &self.base.as_str()).finish()
    }
}

impl ApiClient {
    pub fn new(settings: &Settings, credentials: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let base = Url::parse(settings.api_base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", settings.api_base_url)))?;
        let http = Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.load().is_some()
    }

    pub async fn get(&self, endpoint: &Endpoint) -> Result<Value, ApiError> {
        self.send(Method::GET, endpoint, None).await
    }

    /// GET a list endpoint. `null` is an empty list; rows that are not
    /// objects are skipped with a warning instead of failing the page.
    pub async fn get_list<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<Vec<T>, ApiError> {
        let body = self.get(endpoint).await?;
        let rows = match body {
            Value::Null => return Ok(Vec::new()),
            Value::Array(rows) => rows,
            Value::Object(mut map) => match ["items", "data", "results"]
                .iter()
                .find_map(|key| match map.remove(*key) {
                    Some(Value::Array(rows)) => Some(rows),
                    _ => None,
                }) {
                Some(rows) => rows,
                None => {
                    return Err(ApiError::Decode(format!(
                        "{} did not return a list",
                        endpoint.path()
                    )))
                }
            },
            other => {
                return Err(ApiError::Decode(format!(
                    "{} returned {other} instead of a list",
                    endpoint.path()
                )))
            }
        };

        let total = rows.len();
        let parsed: Vec<T> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(path = %endpoint.path(), "skipping malformed row: {e}");
                    None
                }
            })
            .collect();
        debug!(path = %endpoint.path(), total, kept = parsed.len(), "list fetched");
        Ok(parsed)
    }

    pub async fn post(&self, endpoint: &Endpoint, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put(&self, endpoint: &Endpoint, body: Option<&Value>) -> Result<Value, ApiError> {
        self.send(Method::PUT, endpoint, body).await
    }

    pub async fn delete(&self, endpoint: &Endpoint) -> Result<Value, ApiError> {
        self.send(Method::DELETE, endpoint, None).await
    }

    /// Issues one request and decodes the JSON reply. An empty 2xx body is
    /// `Value::Null`. A 401 on an authenticated call clears the stored
    /// credential before returning [`ApiError::Unauthorized`].
    pub async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = endpoint.url(&self.base)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(header::ACCEPT, "application/json");

        if endpoint.requires_auth() {
            let token = self.credentials.load().ok_or(ApiError::MissingCredential)?;
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path = %endpoint.path(), "request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && endpoint.requires_auth() {
            warn!(path = %endpoint.path(), "credential rejected, clearing it");
            if let Err(e) = self.credentials.clear() {
                warn!("failed to clear stored credential: {e:#}");
            }
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            // A body cut short still leaves the status to report.
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(status.as_u16(), &text);
            debug!(%method, path = %endpoint.path(), status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
