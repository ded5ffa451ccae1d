use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tdc_client::guard::{self, GuardDecision, GuardKind};
use tdc_client::{FileSessionPersistence, SessionStore, TdcClient};

use crate::settings::Settings;

/// Client plus the files that carry the session between invocations.
pub struct App {
    pub client: TdcClient,
    pub json: bool,
    cookie_path: PathBuf,
}

impl App {
    pub fn open(settings: &Settings, json: bool) -> Result<Self> {
        let session_path = settings.session_path()?;
        let cookie_path = session_path.with_extension("cookies");

        let session =
            SessionStore::with_persistence(Arc::new(FileSessionPersistence::new(&session_path)));
        let client = TdcClient::new(settings.client_config(), session)
            .context("Failed to build HTTP client")?;

        if let Ok(header) = std::fs::read_to_string(&cookie_path) {
            client.restore_cookies(header.trim());
        }
        tracing::debug!("Session file: {}", session_path.display());

        Ok(Self { client, json, cookie_path })
    }

    /// Write the refresh cookie back so the next invocation can rotate tokens.
    pub fn save_cookies(&self) {
        let result = match self.client.cookie_header() {
            Some(header) if self.client.session().is_authenticated() => {
                std::fs::write(&self.cookie_path, header)
            },
            _ => match std::fs::remove_file(&self.cookie_path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            tracing::warn!("Could not update {}: {}", self.cookie_path.display(), e);
        }
    }

    /// Run the route guard for `kind`. Prints the redirect and returns `false` when denied.
    pub fn require(&self, kind: GuardKind) -> bool {
        let decision = guard::enforce(kind, self.client.session(), kind.path());
        report_denial(&decision, kind)
    }

    /// Guard for pages both roles can open: the signed-in role picks the dashboard.
    pub fn require_signed_in(&self) -> bool {
        self.require(self.own_dashboard())
    }

    pub fn own_dashboard(&self) -> GuardKind {
        match self.client.session().user() {
            Some(user) if user.is_admin => GuardKind::Admin,
            _ => GuardKind::User,
        }
    }
}

fn report_denial(decision: &GuardDecision, kind: GuardKind) -> bool {
    let Some(target) = decision.redirect() else {
        return true;
    };
    let reason = match decision {
        GuardDecision::RedirectToLogin { .. } => "not signed in".to_string(),
        GuardDecision::RejectRole => {
            format!("{} requires a different role; signed out", kind.path())
        },
        GuardDecision::RedirectToVerifyEmail => "email not verified".to_string(),
        GuardDecision::Render => String::new(),
    };
    eprintln!("{} {} -> {}", "✗".red(), reason, target.yellow());
    false
}
