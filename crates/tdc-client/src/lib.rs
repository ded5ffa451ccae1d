//! HTTP client for the Thapar Drone Challenge API.
//!
//! ```text
//!  TdcClient::{login, tickets, teams, ...}        endpoints
//!           |
//!     QueryCache / OptimisticList                 cache
//!           |
//!       AuthLayer  <---->  SessionStore           auth_layer, session
//!           |      (bearer, single-flight refresh)
//!       Transport (reqwest + cookie jar)          transport
//! ```
//!
//! Route guards in [`guard`] read the same [`SessionStore`].

pub mod auth_layer;
pub mod cache;
mod client;
pub mod config;
mod endpoints;
pub mod error;
pub mod guard;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth_layer::{AuthLayer, RefreshOutcome};
pub use cache::{OptimisticList, PollHandle, Poller, Position, QueryCache, Tag};
pub use client::TdcClient;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind};
pub use guard::{AccessState, GuardDecision, GuardKind};
pub use session::{
    FileSessionPersistence, MemorySessionPersistence, Session, SessionPersistence, SessionStore,
    SessionStoreError,
};
pub use transport::{HttpTransport, RawResponse, RequestDescriptor, Transport};
