//! User-input validation shared by the settings model and the auth flow.
//!
//! Field-level rules use the `validator` derive; the handful of format
//! checks the derive does not cover (hex colors, CSS lengths, phone
//! numbers) are plain regex helpers.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid regex")
});

static CSS_LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)?(?:px|%|rem|em|vw|ch)|none|auto)$").expect("valid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-.]{7,20}$").expect("valid regex"));

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

/// A single CSS length such as `600px`, `100%` or `40rem`.
pub fn is_css_length(value: &str) -> bool {
    CSS_LENGTH_RE.is_match(value)
}

pub fn is_phone_number(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_phone_number(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message(Cow::Borrowed("must be a valid phone number")))
    }
}

/// Sign-up form submitted by a new user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirmation: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl RegisterInput {
    /// Trim the identifying fields. Run before validation so the rules
    /// apply to the values that get stored. A blank phone becomes `None`.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            ..self
        }
    }
}

/// Validate a registration form, flattening every field error into one
/// message ordered by field name.
pub fn validate_registration(input: &RegisterInput) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(describe_errors(&errors)))
}

/// Render `ValidationErrors` as `field: message; field: message`.
pub fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn valid_input() -> RegisterInput {
        RegisterInput {
            username: "marco".to_string(),
            email: "marco@trattoria.example".to_string(),
            password: "secret1".to_string(),
            password_confirmation: "secret1".to_string(),
            phone: None,
        }
    }

    #[test]
    fn hex_colors() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#3B82F6"));
        assert!(is_hex_color("#3b82f680"));
        assert!(!is_hex_color("3b82f6"));
        assert!(!is_hex_color("#3b82f"));
        assert!(!is_hex_color("red"));
    }

    #[test]
    fn css_lengths() {
        assert!(is_css_length("600px"));
        assert!(is_css_length("100%"));
        assert!(is_css_length("42.5rem"));
        assert!(is_css_length("none"));
        assert!(!is_css_length("600"));
        assert!(!is_css_length("600px; color: red"));
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&valid_input()).is_ok());
    }

    #[test]
    fn password_mismatch_is_reported() {
        let input = RegisterInput {
            password_confirmation: "other".to_string(),
            ..valid_input()
        };
        let err = validate_registration(&input).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("password_confirmation: passwords do not match"));
    }

    #[test]
    fn short_password_and_bad_email_reported_together() {
        let input = RegisterInput {
            email: "not-an-email".to_string(),
            password: "abc".to_string(),
            password_confirmation: "abc".to_string(),
            ..valid_input()
        };
        let err = validate_registration(&input).unwrap_err();
        let CoreError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("email: must be a valid email address"));
        assert!(msg.contains("password: must be at least 6 characters"));
        // Sorted by field name.
        assert!(msg.find("email").unwrap() < msg.find("password").unwrap());
    }

    #[test]
    fn padding_does_not_count_toward_length() {
        let input = RegisterInput {
            username: "  ab  ".to_string(),
            email: " ab@trattoria.example ".to_string(),
            phone: Some("   ".to_string()),
            ..valid_input()
        }
        .normalized();
        assert_eq!(input.username, "ab");
        assert_eq!(input.email, "ab@trattoria.example");
        assert_eq!(input.phone, None);
        assert_matches!(
            validate_registration(&input),
            Err(CoreError::Validation(msg)) if msg.starts_with("username:")
        );
    }

    #[test]
    fn malformed_phone_rejected() {
        let input = RegisterInput {
            phone: Some("call me".to_string()),
            ..valid_input()
        };
        assert!(validate_registration(&input).is_err());

        let input = RegisterInput {
            phone: Some("+39 06 1234 5678".to_string()),
            ..valid_input()
        };
        assert!(validate_registration(&input).is_ok());
    }
}
