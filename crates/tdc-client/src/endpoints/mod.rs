//! Resource endpoints, grouped by entity.
//!
//! Each operation is an inherent method on [`crate::TdcClient`]. Queries are
//! cached under a [`crate::cache::QueryKey`]; mutations invalidate the
//! [`crate::Tag`]s whose data they change. Forms are validated before any
//! request is sent.

mod admin;
mod auth;
mod otp;
mod tickets;
mod user;

pub(crate) mod paths {
    pub const REGISTER: &str = "users/register/";
    pub const LOGIN: &str = "users/login/";
    pub const ADMIN_LOGIN: &str = "admin/login/";
    pub const LOGOUT: &str = "users/logout/";

    pub const OTP_GENERATE: &str = "users/otp/generate/";
    pub const VERIFY_EMAIL: &str = "users/verify/email/";
    pub const VALIDATE_OTP: &str = "users/validate/otp/";
    pub const RESET_PASSWORD: &str = "users/reset/password/";

    pub const USER_DETAILS: &str = "users/details/";
    pub const USER_NOTIFICATIONS: &str = "users/notifications/";
    pub const ADD_VIDEO: &str = "users/add-video/";
    pub const FREEZE_VIDEO: &str = "users/freeze-video/";

    pub const ADMIN_TEAMS: &str = "admin/teams/";
    pub const ADMIN_NOTIFICATIONS: &str = "admin/notifications/";

    pub const TICKETS: &str = "tickets/view/";
    pub const CREATE_TICKET: &str = "tickets/create/";
    pub const SEND_MESSAGE: &str = "tickets/message/";
    pub const MARK_AS_READ: &str = "tickets/mark-as-read/";
    pub const MARK_AS_CLOSED: &str = "tickets/mark-as-closed/";

    pub fn admin_team(id: i64) -> String {
        format!("{}{}/", ADMIN_TEAMS, id)
    }

    pub fn admin_notification(id: i64) -> String {
        format!("{}{}/", ADMIN_NOTIFICATIONS, id)
    }
}

use crate::error::ClientError;
use tdc_types::FieldErrors;

/// Client-side validation failure on a single field.
pub(crate) fn field_error(field: &str, message: &str) -> ClientError {
    let mut fields = FieldErrors::new();
    fields.insert(field.to_string(), vec![message.to_string()]);
    ClientError::Validation { fields }
}
