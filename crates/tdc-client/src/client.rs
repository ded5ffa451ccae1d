use crate::auth_layer::AuthLayer;
use crate::cache::{QueryCache, QueryKey, Tag};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionStore;
use crate::transport::{HttpTransport, RequestDescriptor, Transport};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Entry point for every API call.
///
/// Cheap to clone; clones share the session, the refresh slot and the
/// query cache.
#[derive(Clone)]
pub struct TdcClient {
    layer: AuthLayer,
    cache: Arc<QueryCache>,
    config: ClientConfig,
    http: Option<Arc<HttpTransport>>,
}

impl TdcClient {
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self, ClientError> {
        let http = Arc::new(HttpTransport::new(&config)?);
        let mut client = Self::with_transport(config, session, http.clone());
        client.http = Some(http);
        Ok(client)
    }

    /// Use a custom transport (tests, proxies).
    pub fn with_transport(
        config: ClientConfig,
        session: SessionStore,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let cache = Arc::new(QueryCache::new(config.poll_interval()));
        Self { layer: AuthLayer::new(transport, session), cache, config, http: None }
    }

    pub fn session(&self) -> &SessionStore {
        self.layer.session()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub(crate) fn layer(&self) -> &AuthLayer {
        &self.layer
    }

    /// Refresh calls made so far.
    pub fn refresh_count(&self) -> u64 {
        self.layer.refresh_count()
    }

    /// Refresh cookie header, for persisting across process restarts.
    pub fn cookie_header(&self) -> Option<String> {
        self.http.as_ref().and_then(|http| http.cookie_header())
    }

    pub fn restore_cookies(&self, header: &str) {
        if let Some(http) = &self.http {
            http.restore_cookies(header);
        }
    }

    /// Execute and decode a JSON response.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> Result<T, ClientError> {
        let resp = self.layer.execute(&request).await?;
        if !resp.is_success() {
            return Err(resp.into_error());
        }
        resp.json()
    }

    /// Execute, discarding the response body.
    pub(crate) async fn send_empty(&self, request: RequestDescriptor) -> Result<(), ClientError> {
        let resp = self.layer.execute(&request).await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(resp.into_error())
        }
    }

    /// Cached read: fresh cache hit, otherwise fetch and store under `tags`.
    pub(crate) async fn query<T: Serialize + DeserializeOwned>(
        &self,
        key: QueryKey,
        tags: &[Tag],
        request: RequestDescriptor,
    ) -> Result<T, ClientError> {
        if let Some(hit) = self.cache.get_fresh(&key) {
            tracing::trace!("Cache hit for {}", key.endpoint);
            return Ok(hit);
        }
        let value: T = self.send(request).await?;
        self.cache.insert(key, &value, tags);
        Ok(value)
    }

    pub(crate) fn invalidate(&self, tags: &[Tag]) {
        for tag in tags {
            self.cache.invalidate(*tag);
        }
    }
}
