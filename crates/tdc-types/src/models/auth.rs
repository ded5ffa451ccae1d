//! Authentication, OTP and video submission payloads.

use super::{TeamMember, UserProfile};
use crate::error::validate_otp_code;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST users/register/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RegisterRequest {
    /// Leader email, used to log in
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Account password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Team name shown on the leaderboard
    #[validate(length(min = 1, max = 64, message = "Team name is required"))]
    pub team_name: String,
    /// Leader's full name
    #[validate(length(min = 1, message = "Leader name is required"))]
    pub leader_name: String,
    /// Leader's phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Institute the team represents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
    /// Remaining team members
    #[serde(default)]
    #[validate(nested)]
    pub members: Vec<TeamMember>,
}

/// Body of `POST users/login/` and `POST admin/login/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct LoginRequest {
    /// Login email
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Account password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login, registration or refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    /// New access token
    pub access: String,
    /// Profile of the authenticated user
    pub user: UserProfile,
}

/// Body of `POST users/otp/generate/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct OtpRequest {
    /// Email the OTP is sent to
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
}

/// Body of `POST users/verify/email/` and `POST users/validate/otp/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct VerifyOtpRequest {
    /// Email the OTP was sent to
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Six digit code
    #[validate(custom(function = "validate_otp_code"))]
    pub otp: String,
}

/// Body of `POST users/reset/password/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ResetPasswordRequest {
    /// Account email
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Six digit code from the reset email
    #[validate(custom(function = "validate_otp_code"))]
    pub otp: String,
    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Body of `POST users/add-video/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct AddVideoRequest {
    /// Public link to the video
    #[validate(url(message = "Enter a valid video link"))]
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validate_form;

    #[test]
    fn test_register_validation_collects_fields() {
        let form = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            team_name: "Skyhawks".to_string(),
            leader_name: "A. Leader".to_string(),
            phone: None,
            institute: None,
            members: vec![],
        };

        let fields = validate_form(&form).unwrap_err();
        assert!(fields.contains_key("email"));
        assert_eq!(fields["password"], vec!["Password must be at least 8 characters"]);
        assert!(!fields.contains_key("team_name"));
    }

    #[test]
    fn test_verify_otp_validation() {
        let ok = VerifyOtpRequest { email: "lead@thapar.edu".to_string(), otp: "123456".to_string() };
        assert!(validate_form(&ok).is_ok());

        let bad = VerifyOtpRequest { email: "lead@thapar.edu".to_string(), otp: "12".to_string() };
        assert_eq!(validate_form(&bad).unwrap_err()["otp"], vec!["OTP must be 6 digits"]);
    }

    #[test]
    fn test_video_link_must_be_url() {
        let form = AddVideoRequest { link: "youtube".to_string() };
        assert!(validate_form(&form).is_err());
        let form = AddVideoRequest { link: "https://youtu.be/abc".to_string() };
        assert!(validate_form(&form).is_ok());
    }
}
