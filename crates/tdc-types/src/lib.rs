//! # TDC Types
//!
//! Wire models, API error bodies and client-side form validation for the
//! Thapar Drone Challenge API.
//!
//! - **`error`** - Server error body parsing (`detail` / `error` / per-field arrays)
//! - **`models`** - Users and teams, tickets and messages, notifications, auth payloads
//!
//! ## Architecture Role
//!
//! `tdc-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          tdc-types (this crate)
//!                  │
//!                  ▼
//!             tdc-client
//!                  │
//!                  ▼
//!               tdc-cli
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for the REST API and the persisted session
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

pub use error::{ApiErrorBody, FieldErrors, TOKEN_NOT_VALID};

pub use models::{
    AddVideoRequest, AuthResponse, CreateTicketRequest, LoginRequest, Message, Notification,
    NotificationDraft, OtpRequest, RegisterRequest, ResetPasswordRequest, Role,
    SendMessageRequest, Team, TeamMember, Ticket, TicketRef, TicketStatus, UserProfile,
    VerifyOtpRequest, VideoSubmission,
};
