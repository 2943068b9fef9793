//! HS256 token generation and validation with key rotation

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

use super::error::AuthError;
use crate::domain::user::{User, UserId};

/// Claims carried by an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email at issuance
    pub email: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    /// Create claims for a user valid for `ttl` from `now`
    pub fn new(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Configuration for the JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret
    pub secret: String,
    /// Retired secrets still accepted for verification
    pub previous_secrets: Vec<String>,
    /// Token validity window in hours
    pub ttl_hours: u64,
}

impl JwtConfig {
    /// Create new JWT configuration
    pub fn new(secret: impl Into<String>, ttl_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            previous_secrets: Vec::new(),
            ttl_hours,
        }
    }

    pub fn with_previous_secrets(mut self, secrets: Vec<String>) -> Self {
        self.previous_secrets = secrets;
        self
    }
}

/// JWT service signing with the current secret and verifying with every
/// configured secret
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    ttl: Duration,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[hidden]")
            .field("decoding_keys", &self.decoding_keys.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    ///
    /// Fails when the TTL is zero or too large to compute an expiry.
    pub fn new(config: JwtConfig) -> Result<Self, AuthError> {
        let ttl = token_ttl(config.ttl_hours)?;

        let decoding_keys = std::iter::once(&config.secret)
            .chain(config.previous_secrets.iter())
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
            .collect();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_keys,
            ttl,
        })
    }

    /// Sign a token for the user; returns the token and its expiry
    pub fn generate(&self, user: &User) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenGeneration("expiry out of range".to_string()))?;
        let claims = TokenClaims::new(user, now, self.ttl);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        Ok((token, expires_at))
    }

    /// Verify signature and expiry, then extract the subject
    pub fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let mut last_error = AuthError::InvalidSignature;

        for key in &self.decoding_keys {
            match decode::<Map<String, Value>>(token, key, &validation) {
                Ok(data) => return subject(&data.claims),
                Err(e) => match classify(e.kind()) {
                    // Signed with another key; try the next one
                    AuthError::InvalidSignature => last_error = AuthError::InvalidSignature,
                    other => return Err(other),
                },
            }
        }

        Err(last_error)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn token_ttl(hours: u64) -> Result<Duration, AuthError> {
    if hours == 0 {
        return Err(AuthError::InvalidConfig(
            "token_ttl_hours must be positive".to_string(),
        ));
    }

    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| {
            AuthError::InvalidConfig(format!("token_ttl_hours {} is out of range", hours))
        })
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::MissingRequiredClaim(_) | ErrorKind::InvalidSubject => AuthError::ClaimMissing,
        _ => AuthError::MalformedToken,
    }
}

/// The subject must be a positive integer, as a string or a number
fn subject(claims: &Map<String, Value>) -> Result<UserId, AuthError> {
    let id = match claims.get("sub") {
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    };

    id.and_then(|id| UserId::new(id).ok())
        .ok_or(AuthError::ClaimMissing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{NewUser, UserRole};
    use serde_json::json;

    const SECRET: &str = "test-secret-key-12345";

    fn create_test_user() -> User {
        User::from_new(
            UserId::new(7).unwrap(),
            NewUser {
                email: "b@x.com".to_string(),
                name: "B".to_string(),
                role: UserRole::Member,
                password_hash: "hash".to_string(),
            },
        )
    }

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new(SECRET, 12)).unwrap()
    }

    fn sign(claims: &Value, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        (Utc::now() + Duration::hours(1)).timestamp()
    }

    #[test]
    fn test_generate_and_validate() {
        let service = create_service();
        let user = create_test_user();

        let (token, expires_at) = service.generate(&user).unwrap();
        assert_eq!(service.validate(&token).unwrap(), user.id());

        let remaining = expires_at - Utc::now();
        assert!(remaining > Duration::hours(11));
        assert!(remaining <= Duration::hours(12));
    }

    #[test]
    fn test_claims_contents() {
        let user = create_test_user();
        let now = Utc::now();
        let claims = TokenClaims::new(&user, now, Duration::hours(12));

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "b@x.com");
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn test_tampered_signature() {
        let service = create_service();
        let (token, _) = service.generate(&create_test_user()).unwrap();

        let (head, signature) = token.rsplit_once('.').unwrap();
        let replacement = if signature.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", head, replacement, &signature[1..]);

        assert!(matches!(
            service.validate(&tampered),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = sign(&json!({"sub": "7", "exp": in_one_hour()}), Algorithm::HS256, "other");

        assert!(matches!(
            create_service().validate(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_unexpected_algorithm() {
        let token = sign(&json!({"sub": "7", "exp": in_one_hour()}), Algorithm::HS512, SECRET);

        assert!(matches!(
            create_service().validate(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let past = Utc::now() - Duration::hours(1);
        let token = sign(
            &json!({
                "sub": "7",
                "iat": (past - Duration::hours(12)).timestamp(),
                "exp": past.timestamp(),
            }),
            Algorithm::HS256,
            SECRET,
        );

        assert!(matches!(
            create_service().validate(&token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_missing_subject() {
        let token = sign(&json!({"exp": in_one_hour()}), Algorithm::HS256, SECRET);

        assert!(matches!(
            create_service().validate(&token),
            Err(AuthError::ClaimMissing)
        ));
    }

    #[test]
    fn test_subject_not_an_id() {
        let service = create_service();

        for sub in [json!("alice"), json!("0"), json!(-3), json!(true)] {
            let token = sign(&json!({"sub": sub, "exp": in_one_hour()}), Algorithm::HS256, SECRET);
            assert!(matches!(service.validate(&token), Err(AuthError::ClaimMissing)));
        }

        let numeric = sign(&json!({"sub": 7, "exp": in_one_hour()}), Algorithm::HS256, SECRET);
        assert_eq!(service.validate(&numeric).unwrap().value(), 7);
    }

    #[test]
    fn test_missing_expiry() {
        let token = sign(&json!({"sub": "7"}), Algorithm::HS256, SECRET);

        assert!(matches!(
            create_service().validate(&token),
            Err(AuthError::ClaimMissing)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let service = create_service();

        assert!(matches!(
            service.validate("not-a-token"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            service.validate("a.b.c"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn test_previous_secret_still_verifies() {
        let old = JwtService::new(JwtConfig::new("old-secret", 12)).unwrap();
        let (token, _) = old.generate(&create_test_user()).unwrap();

        let rotated = JwtService::new(
            JwtConfig::new("new-secret", 12).with_previous_secrets(vec!["old-secret".to_string()]),
        )
        .unwrap();
        assert_eq!(rotated.validate(&token).unwrap().value(), 7);

        let without_old = JwtService::new(JwtConfig::new("new-secret", 12)).unwrap();
        assert!(matches!(
            without_old.validate(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        for hours in [0, u64::MAX, i64::MAX as u64, 24 * 365 * 1_000_000] {
            assert!(matches!(
                JwtService::new(JwtConfig::new(SECRET, hours)),
                Err(AuthError::InvalidConfig(_))
            ));
        }

        let year = JwtService::new(JwtConfig::new(SECRET, 24 * 365)).unwrap();
        assert_eq!(year.ttl(), Duration::hours(24 * 365));
    }
}
