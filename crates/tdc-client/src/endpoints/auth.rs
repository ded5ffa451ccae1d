use super::paths;
use crate::auth_layer::RefreshOutcome;
use crate::error::ClientError;
use crate::transport::RequestDescriptor;
use crate::TdcClient;
use tdc_types::error::validate_form;
use tdc_types::{ApiErrorBody, AuthResponse, LoginRequest, RegisterRequest, UserProfile};

impl TdcClient {
    /// Register a team and sign its leader in.
    pub async fn register(&self, form: &RegisterRequest) -> Result<UserProfile, ClientError> {
        validate_form(form)?;
        let request = RequestDescriptor::post(paths::REGISTER).json(form)?.anonymous();
        let auth: AuthResponse = self.send(request).await?;
        Ok(self.sign_in(auth))
    }

    pub async fn login(&self, form: &LoginRequest) -> Result<UserProfile, ClientError> {
        validate_form(form)?;
        let request = RequestDescriptor::post(paths::LOGIN).json(form)?.anonymous();
        let auth: AuthResponse = self.send(request).await?;
        Ok(self.sign_in(auth))
    }

    /// Sign in through the admin endpoint. A non-admin profile is rejected
    /// and the session is left empty.
    pub async fn admin_login(&self, form: &LoginRequest) -> Result<UserProfile, ClientError> {
        validate_form(form)?;
        let request = RequestDescriptor::post(paths::ADMIN_LOGIN).json(form)?.anonymous();
        let auth: AuthResponse = self.send(request).await?;
        if !auth.user.is_admin {
            tracing::warn!("Admin login by non-admin {}", auth.user.email);
            self.session().clear();
            return Err(ClientError::Forbidden("Not an admin account".to_string()));
        }
        Ok(self.sign_in(auth))
    }

    /// End the session. Local state is cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.send_empty(RequestDescriptor::post(paths::LOGOUT)).await;
        if let Err(e) = &result {
            tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
        }
        self.session().clear();
        self.cache().clear();
        Ok(())
    }

    /// Rotate the access token explicitly, e.g. to resume a persisted session.
    pub async fn refresh_session(&self) -> Result<UserProfile, ClientError> {
        match self.layer().refresh().await {
            RefreshOutcome::Refreshed { .. } => self.session().user().ok_or_else(|| {
                ClientError::InvalidResponse("Refresh returned no profile".to_string())
            }),
            RefreshOutcome::Failed { reason } => Err(ClientError::SessionExpired {
                body: ApiErrorBody { detail: Some(reason), ..ApiErrorBody::default() },
            }),
        }
    }

    fn sign_in(&self, auth: AuthResponse) -> UserProfile {
        self.cache().clear();
        self.session().set_credentials(auth.access, auth.user.clone());
        auth.user
    }
}
