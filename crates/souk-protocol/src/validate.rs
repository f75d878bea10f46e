//! Client-side field checks.
//!
//! These run synchronously before a request is built, so a form that
//! fails here never reaches the network. Messages are user-facing.

use crate::ProtocolError;

/// Minimum password length accepted by the login and signup forms.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Exact length of a verification code.
pub const OTP_LEN: usize = 6;

/// Checks that `email` looks like an address: one `@`, a non-empty local
/// part, and a dotted domain without spaces.
pub fn validate_email(email: &str) -> Result<(), ProtocolError> {
    let invalid = || ProtocolError::Validation("Please enter a valid email address".into());
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let mut labels = domain.split('.');
    let all_filled = labels.clone().all(|label| !label.is_empty());
    if labels.nth(1).is_none() || !all_filled {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ProtocolError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ProtocolError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn validate_otp(otp: &str) -> Result<(), ProtocolError> {
    let otp = otp.trim();
    if otp.len() != OTP_LEN || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProtocolError::Validation(format!(
            "OTP must be {OTP_LEN} digits"
        )));
    }
    Ok(())
}

/// Checks that a named field isn't blank.
pub fn validate_required(field: &str, value: &str) -> Result<(), ProtocolError> {
    if value.trim().is_empty() {
        return Err(ProtocolError::Validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts_common_addresses() {
        for email in ["a@b.com", "first.last+tag@sub.example.org", "  x@y.io "] {
            assert!(validate_email(email).is_ok(), "{email} should pass");
        }
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        for email in ["", "plain", "@b.com", "a@", "a@b", "a@@b.com", "a b@c.com", "a@b..com"] {
            assert!(validate_email(email).is_err(), "{email:?} should fail");
        }
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_validate_otp_exact_digits() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("12345a").is_err());
        assert!(validate_otp("1234567").is_err());
    }

    #[test]
    fn test_validate_required_names_field() {
        let err = validate_required("First name", "  ").unwrap_err();
        assert_eq!(err.to_string(), "First name is required");
    }
}
