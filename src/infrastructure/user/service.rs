//! User service for registration and profile management

use std::sync::Arc;

use tracing::info;

use crate::domain::user::{
    validate_display_name, validate_email, validate_password, NewUser, User, UserId,
    UserRepository, UserRole,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `member`
    pub role: Option<String>,
}

/// Request for replacing a user's profile
#[derive(Debug, Clone)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Request for changing a user's password
#[derive(Debug, Clone)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// User service over the credential store
#[derive(Debug, Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Self-service registration
    ///
    /// Only the `member` role may be requested; anything else needs an
    /// administrator through [`UserService::create_user`].
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        let role = requested_role(request.role.as_deref())?;

        if role != UserRole::Member {
            return Err(DomainError::forbidden(format!(
                "Only an administrator may assign the '{}' role",
                role
            )));
        }

        self.insert(request, role).await
    }

    /// Create a user with any role on behalf of an administrator
    pub async fn create_user(
        &self,
        actor: UserId,
        request: RegisterUserRequest,
    ) -> Result<User, DomainError> {
        if !self.is_admin(actor).await? {
            return Err(DomainError::forbidden(format!(
                "User '{}' may not create users",
                actor
            )));
        }

        let role = requested_role(request.role.as_deref())?;
        let user = self.insert(request, role).await?;

        info!(user_id = %user.id(), created_by = %actor, "User created by administrator");
        Ok(user)
    }

    /// Create the first administrator when the store holds no users yet
    ///
    /// Returns `None` when any user already exists.
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        if self.repository.count().await? > 0 {
            return Ok(None);
        }

        let user = self
            .insert(
                RegisterUserRequest {
                    name: "Administrator".to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                    role: None,
                },
                UserRole::Admin,
            )
            .await?;

        Ok(Some(user))
    }

    async fn insert(&self, request: RegisterUserRequest, role: UserRole) -> Result<User, DomainError> {
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_display_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hasher.hash(&request.password)?;

        let user = self
            .repository
            .create(NewUser {
                email: request.email,
                name: request.name,
                role,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id(), role = %user.role(), "Registered user");
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    /// Replace a user's name, email and role
    pub async fn update(
        &self,
        actor: UserId,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let actor_is_admin = self.ensure_can_manage(actor, id).await?;

        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_display_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        let role = parse_role(&request.role)?;

        let mut user = self.get(id).await?;

        if role != user.role() && !actor_is_admin {
            return Err(DomainError::forbidden(format!(
                "User '{}' may not change roles",
                actor
            )));
        }

        user.set_profile(request.name, request.email, role);

        self.repository.update(&user).await
    }

    /// Change a user's password after verifying the current one
    pub async fn change_password(
        &self,
        actor: UserId,
        id: UserId,
        request: ChangePasswordRequest,
    ) -> Result<(), DomainError> {
        self.ensure_can_manage(actor, id).await?;

        let mut user = self.get(id).await?;

        if !self.hasher.verify(&request.old_password, user.password_hash()) {
            return Err(DomainError::validation("Current password is incorrect"));
        }

        validate_password(&request.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let new_hash = self.hasher.hash(&request.new_password)?;
        user.set_password_hash(new_hash);
        self.repository.update(&user).await?;

        info!(user_id = %id, "Changed password");
        Ok(())
    }

    /// Delete a user
    pub async fn delete(&self, actor: UserId, id: UserId) -> Result<(), DomainError> {
        self.ensure_can_manage(actor, id).await?;

        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        info!(user_id = %id, deleted_by = %actor, "Deleted user");
        Ok(())
    }

    /// Users manage themselves; admins manage everyone
    ///
    /// Returns whether the actor is an administrator.
    async fn ensure_can_manage(&self, actor: UserId, target: UserId) -> Result<bool, DomainError> {
        let actor_is_admin = self.is_admin(actor).await?;

        if actor == target || actor_is_admin {
            return Ok(actor_is_admin);
        }

        Err(DomainError::forbidden(format!(
            "User '{}' may not modify user '{}'",
            actor, target
        )))
    }

    async fn is_admin(&self, id: UserId) -> Result<bool, DomainError> {
        Ok(matches!(
            self.repository.get(id).await?,
            Some(user) if user.role() == UserRole::Admin
        ))
    }
}

fn parse_role(role: &str) -> Result<UserRole, DomainError> {
    role.parse::<UserRole>()
        .map_err(|e| DomainError::validation(e.to_string()))
}

fn requested_role(role: Option<&str>) -> Result<UserRole, DomainError> {
    role.map(parse_role).transpose().map(Option::unwrap_or_default)
}
