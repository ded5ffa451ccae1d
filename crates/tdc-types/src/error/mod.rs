//! Error bodies returned by the API.
//!
//! The server answers failures with one of a few JSON shapes:
//!
//! - `{"detail": "..."}` or `{"error": "..."}` for general failures
//! - `{"code": "token_not_valid", "detail": "..."}` for expired access tokens
//! - `{"email": ["..."], "password": ["..."]}` for per-field validation
//!
//! [`ApiErrorBody`] normalizes all of them.

mod validation;

pub use validation::{validate_form, validate_otp_code};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error code the server sends with a 401 when the access token is expired or invalid.
pub const TOKEN_NOT_VALID: &str = "token_not_valid";

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Normalized error body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Machine-readable code (`token_not_valid`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable message from `detail`, `error` or `message`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Field-level validation messages
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldErrors,
}

impl ApiErrorBody {
    /// Parse a raw response body. Bodies that are not JSON objects are kept as the detail text.
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(raw) {
            Ok(value) => Self::from_value(&value),
            Err(_) => {
                let text = String::from_utf8_lossy(raw).trim().to_string();
                Self { detail: (!text.is_empty()).then_some(text), ..Default::default() }
            },
        }
    }

    /// Build from an already decoded JSON value.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let mut body = Self::default();
        let Some(object) = value.as_object() else {
            if let Some(text) = value.as_str() {
                body.detail = Some(text.to_string());
            }
            return body;
        };

        for (key, entry) in object {
            match (key.as_str(), entry) {
                ("code", serde_json::Value::String(code)) => body.code = Some(code.clone()),
                ("detail" | "error" | "message", serde_json::Value::String(text)) => {
                    body.detail.get_or_insert_with(|| text.clone());
                },
                // simplejwt nests per-token diagnostics here
                ("messages", _) => {},
                (field, serde_json::Value::Array(items)) => {
                    let messages: Vec<String> =
                        items.iter().filter_map(|m| m.as_str().map(str::to_string)).collect();
                    if !messages.is_empty() {
                        body.fields.insert(field.to_string(), messages);
                    }
                },
                (field, serde_json::Value::String(text)) => {
                    body.fields.insert(field.to_string(), vec![text.clone()]);
                },
                _ => {},
            }
        }
        body
    }

    /// True when this body signals an expired or invalid access token.
    pub fn is_token_invalid(&self) -> bool {
        self.code.as_deref() == Some(TOKEN_NOT_VALID)
    }

    /// True when the body carries per-field validation messages.
    pub fn has_field_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Best single-line description for display.
    pub fn message(&self) -> String {
        if let Some(detail) = &self.detail {
            return detail.clone();
        }
        if let Some(non_field) = self.fields.get("non_field_errors").and_then(|m| m.first()) {
            return non_field.clone();
        }
        if let Some((field, messages)) = self.fields.iter().next() {
            return format!("{}: {}", field, messages.join(" "));
        }
        self.code.clone().unwrap_or_else(|| "Unknown error".to_string())
    }
}
