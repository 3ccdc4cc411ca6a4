//! Shared plumbing for backends reached over HTTP (CouchDB, Couchbase, RavenDB).

use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use std::time::Duration;

use crate::errors::ApiError;

/// Base URL plus basic-auth credentials taken from the URL's user-info.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: Client,
    base: Url,
    username: Option<String>,
    password: Option<String>,
}

impl HttpEndpoint {
    /// Parse `uri`, moving any `user:password@` part into basic auth.
    pub fn from_uri(uri: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, uri)
    }

    pub fn with_client(client: Client, uri: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(uri)
            .map_err(|e| ApiError::BadRequest(format!("Invalid backend URL {}: {}", uri, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::BadRequest(format!("Invalid backend URL {}", uri)));
        }

        let username = Some(base.username().to_string()).filter(|u| !u.is_empty());
        let password = base.password().map(str::to_string);

        // Infallible once cannot_be_a_base() has been ruled out
        let _ = base.set_username("");
        let _ = base.set_password(None);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client,
            base,
            username,
            password,
        })
    }

    /// Reuse another endpoint's credentials when this URL carried none.
    pub fn inherit_credentials(mut self, other: &HttpEndpoint) -> Self {
        if self.username.is_none() {
            self.username = other.username.clone();
            self.password = other.password.clone();
        }
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a path relative to the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::BadRequest(format!("Invalid backend path {}: {}", path, e)))
    }

    /// Start an authenticated request.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        debug!("HTTP backend: {} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        })
    }
}

/// Turn a non-2xx response into [`ApiError::BackendOperationFailed`]
/// carrying the status and body.
pub async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::BackendOperationFailed(format!("{}: {}", status, body)))
}

/// `Ok(None)` for 404, otherwise the same as [`ensure_success`].
pub async fn success_or_not_found(response: Response) -> Result<Option<Response>, ApiError> {
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    ensure_success(response).await.map(Some)
}
