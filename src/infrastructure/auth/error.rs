use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised while issuing or validating bearer tokens
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is missing a required claim")]
    ClaimMissing,

    #[error("failed to generate token: {0}")]
    TokenGeneration(String),

    #[error("invalid token configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl AuthError {
    /// Whether the error concerns the presented token rather than the store
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken | Self::InvalidSignature | Self::Expired | Self::ClaimMissing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors() {
        assert!(AuthError::Expired.is_token_error());
        assert!(AuthError::ClaimMissing.is_token_error());
        assert!(!AuthError::InvalidCredentials.is_token_error());
        assert!(!AuthError::Store(DomainError::storage("down")).is_token_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(AuthError::Expired.to_string(), "token has expired");
        assert_eq!(
            AuthError::Store(DomainError::storage("down")).to_string(),
            "Storage error: down"
        );
    }
}
