use super::paths;
use crate::cache::Tag;
use crate::error::ClientError;
use crate::transport::RequestDescriptor;
use crate::TdcClient;
use tdc_types::error::validate_form;
use tdc_types::{OtpRequest, ResetPasswordRequest, VerifyOtpRequest};

impl TdcClient {
    /// Email a one-time code to `email`.
    pub async fn request_otp(&self, email: &str) -> Result<(), ClientError> {
        let form = OtpRequest { email: email.to_string() };
        validate_form(&form)?;
        self.send_empty(RequestDescriptor::post(paths::OTP_GENERATE).json(&form)?).await
    }

    /// Confirm the signed-in user's email. Flips `email_verified` locally on success.
    pub async fn verify_email(&self, form: &VerifyOtpRequest) -> Result<(), ClientError> {
        validate_form(form)?;
        self.send_empty(RequestDescriptor::post(paths::VERIFY_EMAIL).json(form)?).await?;
        self.session().mark_email_verified();
        self.invalidate(&[Tag::User, Tag::Teams]);
        Ok(())
    }

    /// Check a code without consuming it (first step of password reset).
    pub async fn validate_otp(&self, form: &VerifyOtpRequest) -> Result<(), ClientError> {
        validate_form(form)?;
        self.send_empty(RequestDescriptor::post(paths::VALIDATE_OTP).json(form)?).await
    }

    pub async fn reset_password(&self, form: &ResetPasswordRequest) -> Result<(), ClientError> {
        validate_form(form)?;
        self.send_empty(RequestDescriptor::post(paths::RESET_PASSWORD).json(form)?).await
    }
}
