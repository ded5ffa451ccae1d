//! Authenticated Query Layer.
//!
//! Attaches the bearer token to every request and recovers once from an
//! expired access token:
//!
//! 1. A 401 with `code: token_not_valid` clears the token the request was
//!    sent with (only if it is still the current one).
//! 2. The request joins the refresh already in flight, or starts one.
//!    The refresh itself is never retried.
//! 3. On success the original request is replayed exactly once with the new
//!    token and the replay's response is returned as-is.
//! 4. On failure the session is cleared and the original 401 is returned.
//!
//! Refreshes are single-flight per layer: concurrent failures share one
//! refresh call, so a rotating refresh cookie is only spent once.

use crate::error::ClientError;
use crate::session::SessionStore;
use crate::transport::{RawResponse, RequestDescriptor, Transport};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tdc_types::AuthResponse;

/// Rotates the access token using the refresh cookie.
pub const REFRESH_PATH: &str = "users/refresh/";

/// Result of one refresh call, shared by every waiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { access_token: String },
    Failed { reason: String },
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    id: u64,
    refresh: SharedRefresh,
}

struct LayerInner {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    in_flight: Mutex<Option<InFlight>>,
    next_refresh_id: AtomicU64,
    refresh_calls: AtomicU64,
}

/// Bearer-token request executor with transparent single-flight refresh.
#[derive(Clone)]
pub struct AuthLayer {
    inner: Arc<LayerInner>,
}

impl AuthLayer {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(LayerInner {
                transport,
                session,
                in_flight: Mutex::new(None),
                next_refresh_id: AtomicU64::new(0),
                refresh_calls: AtomicU64::new(0),
            }),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Number of refresh calls put on the wire so far.
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    /// Send `request`, refreshing and replaying once on an expired token.
    ///
    /// Only network failures are `Err`; HTTP errors come back as responses.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, ClientError> {
        let sent_with = if request.anonymous { None } else { self.inner.session.access_token() };
        let original = self.inner.transport.send(request, sent_with.as_deref()).await?;

        if request.anonymous || !original.is_token_invalid() {
            return Ok(original);
        }
        tracing::debug!("{} {}: access token rejected", request.method, request.path);

        if let Some(stale) = sent_with.as_deref() {
            self.inner.session.clear_token_if(stale);
        }

        // Another request may already have rotated the token.
        let current = self.inner.session.access_token();
        let fresh_token = match current {
            Some(token) if Some(&token) != sent_with.as_ref() => token,
            _ => match self.refresh().await {
                RefreshOutcome::Refreshed { access_token } => access_token,
                RefreshOutcome::Failed { reason } => {
                    tracing::warn!(
                        "{} {}: refresh failed ({}), surfacing original failure",
                        request.method,
                        request.path,
                        reason
                    );
                    return Ok(original);
                },
            },
        };

        tracing::debug!("{} {}: replaying with refreshed token", request.method, request.path);
        self.inner.transport.send(request, Some(&fresh_token)).await
    }

    /// Refresh the access token, joining a refresh already in flight.
    ///
    /// The refresh runs on its own task; dropping every waiter does not
    /// cancel the network call or leave the slot occupied.
    pub async fn refresh(&self) -> RefreshOutcome {
        let refresh = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some(in_flight) => {
                    tracing::debug!("Joining in-flight refresh #{}", in_flight.id);
                    in_flight.refresh.clone()
                },
                None => {
                    let id = self.inner.next_refresh_id.fetch_add(1, Ordering::SeqCst);
                    let inner = self.inner.clone();
                    // The slot lock is held until the entry below is stored, so the
                    // task cannot clear it before it exists.
                    let task = tokio::spawn(async move {
                        let outcome = refresh_once(inner.clone()).await;
                        let mut slot = inner.in_flight.lock();
                        if slot.as_ref().is_some_and(|in_flight| in_flight.id == id) {
                            *slot = None;
                        }
                        outcome
                    });
                    let refresh = async move {
                        task.await.unwrap_or_else(|e| RefreshOutcome::Failed {
                            reason: format!("refresh task ended: {}", e),
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(InFlight { id, refresh: refresh.clone() });
                    refresh
                },
            }
        };

        refresh.await
    }
}

async fn refresh_once(inner: Arc<LayerInner>) -> RefreshOutcome {
    inner.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tracing::debug!("Refreshing access token");

    let request = RequestDescriptor::get(REFRESH_PATH);
    let outcome = match inner.transport.send(&request, None).await {
        Ok(resp) if resp.is_success() => match resp.json::<AuthResponse>() {
            Ok(auth) => {
                inner.session.set_credentials(auth.access.clone(), auth.user);
                RefreshOutcome::Refreshed { access_token: auth.access }
            },
            Err(e) => RefreshOutcome::Failed { reason: e.to_string() },
        },
        Ok(resp) => RefreshOutcome::Failed { reason: resp.into_error().to_string() },
        Err(e) => RefreshOutcome::Failed { reason: e.to_string() },
    };

    if let RefreshOutcome::Failed { reason } = &outcome {
        tracing::warn!("Token refresh failed: {}", reason);
        inner.session.clear();
    }
    outcome
}
