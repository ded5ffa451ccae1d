//! Raw HTTP plumbing.
//!
//! [`Transport`] is the seam between the authentication layer and the network.
//! It reports every HTTP status as `Ok`; only failures that produced no
//! response at all are errors.

use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tdc_types::ApiErrorBody;
use url::Url;

/// Description of a request, independent of credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the base URL, e.g. `users/details/`.
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Never attach the bearer token (login, registration).
    pub anonymous: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, anonymous: false }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("Unserializable body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send without the bearer token.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub fn error_body(&self) -> ApiErrorBody {
        ApiErrorBody::parse(&self.body)
    }

    /// 401 carrying `code: token_not_valid`. Any other 401 does not qualify.
    pub fn is_token_invalid(&self) -> bool {
        self.status == 401 && self.error_body().is_token_invalid()
    }

    /// Convert a non-2xx response into the matching error.
    pub fn into_error(self) -> ClientError {
        let body = self.error_body();
        ClientError::from_status(self.status, body)
    }
}

/// Sends requests to the API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `Authorization: Bearer <bearer>` when given.
    async fn send(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ClientError>;
}

/// [`Transport`] backed by reqwest, with a cookie jar holding the refresh cookie.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ClientError::Config(format!("base URL {:?}: {}", config.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self { client, base_url, jar })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Cookies the jar would send to the API, as a `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        self.jar.cookies(&self.base_url).and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Re-seed the jar from a header produced by [`Self::cookie_header`].
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base_url);
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("path {:?}: {}", path, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ClientError> {
        let url = self.url(&request.path)?;
        tracing::debug!("{} {} (bearer: {})", request.method, url, bearer.is_some());

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(RawResponse { status, body })
    }
}
