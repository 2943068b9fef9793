//! User validation utilities

use thiserror::Error;
use validator::ValidateEmail;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID must be a positive integer")]
    InvalidId,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Unknown role '{0}'. Expected one of: admin, manager, member")]
    UnknownRole(String),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a user ID (store-assigned, always positive)
pub fn validate_user_id(id: i64) -> Result<(), UserValidationError> {
    if id <= 0 {
        return Err(UserValidationError::InvalidId);
    }

    Ok(())
}

/// Validate an email address
///
/// Emails are compared exactly as stored, so no normalization happens here.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !email.validate_email() {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a display name
///
/// Rules:
/// - Cannot be blank
/// - Maximum 100 characters
pub fn validate_display_name(name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id() {
        assert!(validate_user_id(1).is_ok());
        assert_eq!(validate_user_id(0), Err(UserValidationError::InvalidId));
        assert_eq!(validate_user_id(-4), Err(UserValidationError::InvalidId));
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
        assert!(matches!(
            validate_email("not-an-email"),
            Err(UserValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("missing@"),
            Err(UserValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@x.com", "a".repeat(260));
        assert_eq!(
            validate_email(&email),
            Err(UserValidationError::EmailTooLong(254))
        );
    }

    #[test]
    fn test_display_name() {
        assert!(validate_display_name("Ann").is_ok());
        assert_eq!(validate_display_name("   "), Err(UserValidationError::EmptyName));
        assert_eq!(
            validate_display_name(&"n".repeat(101)),
            Err(UserValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("short"),
            Err(UserValidationError::PasswordTooShort(8))
        );
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(129);
        assert_eq!(
            validate_password(&long_password),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_password_boundaries() {
        assert!(validate_password(&"a".repeat(8)).is_ok());
        assert!(validate_password(&"a".repeat(128)).is_ok());
    }
}
