//! In-memory user repository implementation

use async_trait::async_trait;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::InMemoryDatabase;

/// In-memory implementation of UserRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    db: InMemoryDatabase,
}

impl InMemoryUserRepository {
    /// Create a repository over the given store
    pub fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let state = self.db.lock().await;
        Ok(state.users.get(&id.value()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.db.lock().await.user_by_email(email)
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        self.db.lock().await.insert_user(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.db.lock().await;
        let id = user.id().value();

        if !state.users.contains_key(&id) {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        if state
            .users
            .values()
            .any(|u| u.id() != user.id() && u.email() == user.email())
        {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                user.email()
            )));
        }

        state.users.insert(id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        self.db.lock().await.remove_user(id)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.db.lock().await.users.len())
    }
}
