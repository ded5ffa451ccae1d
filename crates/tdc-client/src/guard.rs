//! Route guards.
//!
//! One state machine decides access for both dashboards. [`AccessState::of`]
//! classifies the session, [`evaluate`] turns that into a decision for a
//! guarded location, and [`enforce`] additionally clears the session when the
//! signed-in user holds the wrong role.

use crate::session::{Session, SessionStore};

/// Login page.
pub const LOGIN_PATH: &str = "/login";
/// Email verification step.
pub const VERIFY_EMAIL_PATH: &str = "/verify-email";
/// Participant dashboard.
pub const USER_DASHBOARD_PATH: &str = "/dashboard";
/// Admin dashboard.
pub const ADMIN_DASHBOARD_PATH: &str = "/admin";

/// Who is looking at the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    /// No token, or a token without a profile.
    Anonymous,
    /// Signed in but the email has not been verified yet.
    AuthenticatedUnverified { is_admin: bool },
    AuthenticatedUser,
    AuthenticatedAdmin,
}

impl AccessState {
    pub fn of(session: &Session) -> Self {
        match (&session.access_token, &session.user) {
            (Some(_), Some(user)) if !user.email_verified => {
                Self::AuthenticatedUnverified { is_admin: user.is_admin }
            },
            (Some(_), Some(user)) if user.is_admin => Self::AuthenticatedAdmin,
            (Some(_), Some(_)) => Self::AuthenticatedUser,
            _ => Self::Anonymous,
        }
    }

    const fn is_admin(self) -> Option<bool> {
        match self {
            Self::Anonymous => None,
            Self::AuthenticatedUnverified { is_admin } => Some(is_admin),
            Self::AuthenticatedUser => Some(false),
            Self::AuthenticatedAdmin => Some(true),
        }
    }

    /// Where a freshly signed-in user should land.
    pub const fn home(self) -> &'static str {
        match self {
            Self::Anonymous => LOGIN_PATH,
            Self::AuthenticatedUnverified { .. } => VERIFY_EMAIL_PATH,
            Self::AuthenticatedUser => USER_DASHBOARD_PATH,
            Self::AuthenticatedAdmin => ADMIN_DASHBOARD_PATH,
        }
    }
}

/// Which dashboard is being guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    User,
    Admin,
}

impl GuardKind {
    pub const fn path(self) -> &'static str {
        match self {
            Self::User => USER_DASHBOARD_PATH,
            Self::Admin => ADMIN_DASHBOARD_PATH,
        }
    }

    const fn wants_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// Not signed in. `from` is the location to return to after login.
    RedirectToLogin { from: String },
    /// Signed in with the wrong role; the session is dropped and login shown.
    RejectRole,
    RedirectToVerifyEmail,
}

impl GuardDecision {
    /// Redirect target, or `None` when the page renders.
    pub const fn redirect(&self) -> Option<&'static str> {
        match self {
            Self::Render => None,
            Self::RedirectToLogin { .. } | Self::RejectRole => Some(LOGIN_PATH),
            Self::RedirectToVerifyEmail => Some(VERIFY_EMAIL_PATH),
        }
    }

    pub const fn allows(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Decide access to `location` guarded by `kind`. Pure; never touches the store.
pub fn evaluate(kind: GuardKind, session: &Session, location: &str) -> GuardDecision {
    let state = AccessState::of(session);
    match state.is_admin() {
        None => GuardDecision::RedirectToLogin { from: location.to_string() },
        Some(is_admin) if is_admin != kind.wants_admin() => GuardDecision::RejectRole,
        Some(_) if matches!(state, AccessState::AuthenticatedUnverified { .. }) => {
            GuardDecision::RedirectToVerifyEmail
        },
        Some(_) => GuardDecision::Render,
    }
}

/// [`evaluate`] against the live store, clearing the session on a role mismatch.
pub fn enforce(kind: GuardKind, store: &SessionStore, location: &str) -> GuardDecision {
    let decision = evaluate(kind, &store.snapshot(), location);
    if decision == GuardDecision::RejectRole {
        tracing::warn!("Wrong role for {}, signing out", location);
        store.clear();
    }
    decision
}
