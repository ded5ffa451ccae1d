//! Client-side form validation.
//!
//! Forms are checked before any request leaves the client. Failures use the
//! same [`FieldErrors`] shape as server-side validation so both render the
//! same way.

use super::FieldErrors;
use validator::{Validate, ValidationError, ValidationErrors};

/// Validate a form, collecting messages per field.
pub fn validate_form<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(|errors| to_field_errors(&errors))
}

fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, list) in errors.field_errors() {
        let messages = list
            .iter()
            .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string()))
            .collect();
        fields.insert(field.to_string(), messages);
    }
    fields
}

/// OTP codes are exactly six ASCII digits.
pub fn validate_otp_code(otp: &str) -> Result<(), ValidationError> {
    if otp.len() == 6 && otp.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("otp");
        err.message = Some("OTP must be 6 digits".into());
        Err(err)
    }
}
