//! User infrastructure module
//!
//! Argon2 password hashing, the in-memory and PostgreSQL credential stores and
//! the user service behind registration and profile management.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{generate_temporary_password, Argon2Hasher, PasswordHasher};
pub(crate) use postgres_repository::{
    insert_user, is_foreign_key_violation, is_unique_violation, select_user_by_email,
};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{ChangePasswordRequest, RegisterUserRequest, UpdateUserRequest, UserService};
