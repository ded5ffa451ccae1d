//! In-memory transport for unit tests.

#![allow(clippy::unwrap_used)]

use crate::auth_layer::REFRESH_PATH;
use crate::error::ClientError;
use crate::session::SessionStore;
use crate::transport::{RawResponse, RequestDescriptor, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tdc_types::UserProfile;
use tokio::sync::Barrier;

pub(crate) const TOKEN_INVALID_BODY: &str =
    r#"{"detail":"Given token not valid for any token type","code":"token_not_valid"}"#;

pub(crate) fn profile(is_admin: bool) -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "id": 42,
        "email": "lead@thapar.edu",
        "team_name": "Skyhawks",
        "is_admin": is_admin,
        "email_verified": true,
    }))
    .unwrap()
}

pub(crate) fn auth_body(access: &str) -> String {
    serde_json::json!({ "access": access, "user": profile(false) }).to_string()
}

/// Accepts bearer tokens minted by its own refresh endpoint; rejects the rest
/// with `token_not_valid`.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    accepted: Mutex<HashSet<String>>,
    refresh_response: Mutex<Option<(u16, String)>>,
    refresh_delay: Mutex<Duration>,
    always_reject: Mutex<bool>,
    gate: Mutex<Option<Arc<Barrier>>>,
    rotate_on_reject: Mutex<Option<(SessionStore, String)>>,
    log: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_refresh(&self, status: u16, body: String) {
        *self.refresh_response.lock() = Some((status, body));
    }

    pub(crate) fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock() = delay;
    }

    pub(crate) fn accept(&self, token: &str) {
        self.accepted.lock().insert(token.to_string());
    }

    /// Reject every bearer, including refreshed ones.
    pub(crate) fn reject_everything(&self) {
        *self.always_reject.lock() = true;
    }

    /// Hold rejected requests until `parties` of them have arrived.
    pub(crate) fn gate_rejections(&self, parties: usize) {
        *self.gate.lock() = Some(Arc::new(Barrier::new(parties)));
    }

    /// Simulate a concurrent refresh finishing while a request is in flight.
    pub(crate) fn rotate_on_reject(&self, session: SessionStore, token: &str) {
        self.accept(token);
        *self.rotate_on_reject.lock() = Some((session, token.to_string()));
    }

    pub(crate) fn bearers(&self) -> Vec<Option<String>> {
        self.log.lock().iter().filter(|(p, _)| p != REFRESH_PATH).map(|(_, b)| b.clone()).collect()
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.log.lock().iter().filter(|(p, _)| p == REFRESH_PATH).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ClientError> {
        self.log.lock().push((request.path.clone(), bearer.map(str::to_string)));

        if request.path == REFRESH_PATH {
            let delay = *self.refresh_delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let (status, body) = self
                .refresh_response
                .lock()
                .clone()
                .unwrap_or((401, r#"{"detail":"No refresh cookie"}"#.to_string()));
            if status == 200 {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
                    if let Some(access) = value["access"].as_str() {
                        self.accept(access);
                    }
                }
            }
            return Ok(RawResponse::new(status, body));
        }

        let accepted = !*self.always_reject.lock()
            && bearer.is_some_and(|token| self.accepted.lock().contains(token));
        if accepted {
            return Ok(RawResponse::new(200, r#"{"ok":true}"#));
        }

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        let rotation = self.rotate_on_reject.lock().take();
        if let Some((session, token)) = rotation {
            session.set_credentials(token, profile(false));
        }
        Ok(RawResponse::new(401, TOKEN_INVALID_BODY))
    }
}
