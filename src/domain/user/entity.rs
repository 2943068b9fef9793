//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};

/// User identifier - assigned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        validate_user_id(id)?;
        Ok(Self(id))
    }

    /// Get the inner value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| UserValidationError::InvalidId)?;
        Self::new(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user across the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform administrator
    Admin,
    /// Manages companies and teams
    Manager,
    /// Regular team member answering surveys
    #[default]
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "member" | "team-member" => Ok(Self::Member),
            other => Err(UserValidationError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Argon2 password hash
    pub password_hash: String,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier
    id: UserId,
    /// Unique email, compared exactly as stored
    email: String,
    /// Display name
    name: String,
    /// Platform role
    role: UserRole,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl User {
    /// Materialize a freshly inserted user
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: new_user.email,
            name: new_user.name,
            role: new_user.role,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from stored columns
    pub fn restore(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
        password_hash: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
            password_hash: password_hash.into(),
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Replace the profile fields
    pub fn set_profile(&mut self, name: impl Into<String>, email: impl Into<String>, role: UserRole) {
        self.name = name.into();
        self.email = email.into();
        self.role = role;
        self.touch();
    }

    /// Update the password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User::from_new(
            UserId::new(7).unwrap(),
            NewUser {
                email: "b@x.com".to_string(),
                name: "B".to_string(),
                role: UserRole::Member,
                password_hash: "hashed_password".to_string(),
            },
        )
    }

    #[test]
    fn test_user_id_valid() {
        let id = UserId::new(42).unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_user_id_invalid() {
        assert!(UserId::new(0).is_err());
        assert!("abc".parse::<UserId>().is_err());
        assert!("-1".parse::<UserId>().is_err());
        assert_eq!("15".parse::<UserId>().unwrap().value(), 15);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert_eq!("member".parse::<UserRole>().unwrap(), UserRole::Member);
        assert_eq!("team-member".parse::<UserRole>().unwrap(), UserRole::Member);
        assert!("owner".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Member.to_string(), "member");
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user();

        assert_eq!(user.id().value(), 7);
        assert_eq!(user.email(), "b@x.com");
        assert_eq!(user.name(), "B");
        assert_eq!(user.role(), UserRole::Member);
        assert_eq!(user.password_hash(), "hashed_password");
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn test_user_update_password() {
        let mut user = create_test_user();
        let original_updated = user.updated_at();

        std::thread::sleep(std::time::Duration::from_millis(10));

        user.set_password_hash("new_hash");
        assert_eq!(user.password_hash(), "new_hash");
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_user_set_profile() {
        let mut user = create_test_user();

        user.set_profile("Bea", "bea@x.com", UserRole::Manager);
        assert_eq!(user.name(), "Bea");
        assert_eq!(user.email(), "bea@x.com");
        assert_eq!(user.role(), UserRole::Manager);
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user();

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"role\":\"member\""));
    }
}
