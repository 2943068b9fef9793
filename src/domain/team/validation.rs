//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team ID must be a positive integer")]
    InvalidId,

    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team description cannot exceed {0} characters")]
    DescriptionTooLong(usize),
}

const MAX_TEAM_NAME_LENGTH: usize = 100;
const MAX_TEAM_DESCRIPTION_LENGTH: usize = 1000;

/// Validate a team ID
pub fn validate_team_id(id: i64) -> Result<(), TeamValidationError> {
    if id <= 0 {
        return Err(TeamValidationError::InvalidId);
    }

    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.chars().count() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a team description
pub fn validate_team_description(description: &str) -> Result<(), TeamValidationError> {
    if description.chars().count() > MAX_TEAM_DESCRIPTION_LENGTH {
        return Err(TeamValidationError::DescriptionTooLong(
            MAX_TEAM_DESCRIPTION_LENGTH,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team_ids() {
        assert!(validate_team_id(1).is_ok());
        assert!(validate_team_id(i64::MAX).is_ok());
    }

    #[test]
    fn test_invalid_team_ids() {
        assert_eq!(validate_team_id(0), Err(TeamValidationError::InvalidId));
        assert_eq!(validate_team_id(-1), Err(TeamValidationError::InvalidId));
    }

    #[test]
    fn test_valid_team_names() {
        assert!(validate_team_name("Team").is_ok());
        assert!(validate_team_name("Backend Squad").is_ok());
    }

    #[test]
    fn test_invalid_team_names() {
        assert_eq!(validate_team_name(""), Err(TeamValidationError::EmptyName));
        assert_eq!(validate_team_name("  "), Err(TeamValidationError::EmptyName));
        assert_eq!(
            validate_team_name(&"a".repeat(101)),
            Err(TeamValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_team_description() {
        assert!(validate_team_description("").is_ok());
        assert_eq!(
            validate_team_description(&"d".repeat(1001)),
            Err(TeamValidationError::DescriptionTooLong(1000))
        );
    }
}
